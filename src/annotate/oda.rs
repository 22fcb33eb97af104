//! Astroquery request inference.
//!
//! A run annotation targets the activity that performed it. From there the
//! plan (action) is reached, and the module the run used is linked to that
//! action and to the object, region or image it requested. Region and image
//! request parameters get canonical default values.

use super::{AnnotationContext, Footprint, Stage, StageKind, single};
use crate::astro::{Angle, SkyCoord, format_float};
use crate::error::AnnotateResult;
use crate::graph::{Iri, Term, Triple, TripleStore};
use crate::vocab;

/// Relations removed from a run once it has been processed.
const RUN_RELATIONS: [&str; 4] = [
    vocab::ODA_IS_USING,
    vocab::ODA_IS_REQUESTING_ASTRO_REGION,
    vocab::ODA_IS_REQUESTING_ASTRO_OBJECT,
    vocab::ODA_IS_REQUESTING_ASTRO_IMAGE,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct OdaInference;

/// The module, action and run one request is being resolved for.
struct Request<'a> {
    run: &'a Term,
    module: &'a Term,
    action: &'a Term,
}

impl Request<'_> {
    /// Link the module to the action and to the requested node, if the run
    /// requests one through `requesting`.
    fn link(&self, graph: &mut dyn TripleStore, requesting: &str, requests: &str) -> Option<Term> {
        let target = graph
            .objects(self.run, &Iri::new(requesting))
            .into_iter()
            .next()?;
        graph.insert(Triple::new(
            self.module.clone(),
            vocab::ODA_IS_USED_DURING,
            self.action.clone(),
        ));
        graph.insert(Triple::new(self.module.clone(), requests, target.clone()));
        Some(target)
    }
}

/// The title of the single node reached from `node` through `predicate`.
fn field_title(graph: &dyn TripleStore, node: &Term, predicate: &str) -> Option<(Term, String)> {
    let field = single(graph.objects(node, &Iri::new(predicate)), predicate, node)?;
    let title = single(
        graph.objects(&field, &Iri::new(vocab::DCTERMS_TITLE)),
        "title",
        &field,
    )?;
    Some((field, title.lexical().to_string()))
}

fn set_default_value(graph: &mut dyn TripleStore, node: Term, value: String) {
    tracing::debug!(%node, %value, "oda: default value");
    graph.insert(Triple::new(node, vocab::SCHEMA_DEFAULT_VALUE, Term::literal(value)));
}

/// `RA=<deg> deg  Dec=<deg> deg`
pub fn region_coordinates(text: &str) -> AnnotateResult<String> {
    let coord = SkyCoord::parse(text)?;
    Ok(format!(
        "RA={} deg  Dec={} deg",
        format_float(coord.ra_deg()),
        format_float(coord.dec_deg())
    ))
}

/// `<arcmin> arcmin`
pub fn region_radius(text: &str) -> AnnotateResult<String> {
    Ok(format!("{} arcmin", format_float(Angle::parse(text, None)?.arcmin())))
}

/// `<dec> <ra> unit=deg` for a pair, the comma-joined tokens otherwise.
pub fn image_position(text: &str) -> AnnotateResult<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if let [ra, dec] = tokens.as_slice() {
        let coord = SkyCoord::from_pair(ra, dec)?;
        return Ok(format!(
            "{} {} unit=deg",
            format_float(coord.dec_deg()),
            format_float(coord.ra_deg())
        ));
    }
    Ok(tokens.join(","))
}

/// `<arcmin> unit=arcmin`
pub fn image_radius(text: &str) -> AnnotateResult<String> {
    Ok(format!(
        "{} unit=arcmin",
        format_float(Angle::parse(text, None)?.arcmin())
    ))
}

fn process_object(graph: &mut dyn TripleStore, request: &Request<'_>) {
    request.link(
        graph,
        vocab::ODA_IS_REQUESTING_ASTRO_OBJECT,
        vocab::ODA_REQUESTS_ASTRO_OBJECT,
    );
}

fn process_region(graph: &mut dyn TripleStore, request: &Request<'_>) -> AnnotateResult<()> {
    let Some(region) = request.link(
        graph,
        vocab::ODA_IS_REQUESTING_ASTRO_REGION,
        vocab::ODA_REQUESTS_ASTRO_REGION,
    ) else {
        return Ok(());
    };
    if let Some((node, title)) = field_title(graph, &region, vocab::ODA_IS_USING_SKY_COORDINATES) {
        set_default_value(graph, node, region_coordinates(&title)?);
    }
    if let Some((node, title)) = field_title(graph, &region, vocab::ODA_IS_USING_RADIUS) {
        set_default_value(graph, node, region_radius(&title)?);
    }
    Ok(())
}

fn process_image(graph: &mut dyn TripleStore, request: &Request<'_>) -> AnnotateResult<()> {
    let Some(image) = request.link(
        graph,
        vocab::ODA_IS_REQUESTING_ASTRO_IMAGE,
        vocab::ODA_REQUESTS_ASTRO_IMAGE,
    ) else {
        return Ok(());
    };
    if let Some((node, title)) = field_title(graph, &image, vocab::ODA_IS_USING_COORDINATES) {
        // Only a single token (an object name) is kept.
        if let [name] = title.split_whitespace().collect::<Vec<_>>().as_slice() {
            set_default_value(graph, node, (*name).to_string());
        }
    }
    if let Some((node, title)) = field_title(graph, &image, vocab::ODA_IS_USING_POSITION) {
        set_default_value(graph, node, image_position(&title)?);
    }
    if let Some((node, title)) = field_title(graph, &image, vocab::ODA_IS_USING_RADIUS) {
        set_default_value(graph, node, image_radius(&title)?);
    }
    if let Some((node, title)) = field_title(graph, &image, vocab::ODA_IS_USING_PIXELS) {
        let pixels = title.split_whitespace().collect::<Vec<_>>().join(",");
        set_default_value(graph, node, pixels);
    }
    if let Some((node, title)) = field_title(graph, &image, vocab::ODA_IS_USING_IMAGE_BAND) {
        set_default_value(graph, node, title);
    }
    Ok(())
}

impl Stage for OdaInference {
    fn kind(&self) -> StageKind {
        StageKind::Oda
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            reads: &[
                vocab::OA_HAS_TARGET,
                vocab::PROV_QUALIFIED_ASSOCIATION,
                vocab::PROV_HAD_PLAN,
                vocab::ODA_IS_USING,
                vocab::ODA_IS_REQUESTING_ASTRO_OBJECT,
                vocab::ODA_IS_REQUESTING_ASTRO_REGION,
                vocab::ODA_IS_REQUESTING_ASTRO_IMAGE,
                vocab::DCTERMS_TITLE,
            ],
            deletes: &RUN_RELATIONS,
        }
    }

    fn run(&self, graph: &mut dyn TripleStore, _ctx: &mut AnnotationContext) -> AnnotateResult<()> {
        let association = Iri::new(vocab::PROV_QUALIFIED_ASSOCIATION);
        let had_plan = Iri::new(vocab::PROV_HAD_PLAN);
        for (run, activity) in graph.subject_objects(&Iri::new(vocab::OA_HAS_TARGET)) {
            for assoc in graph.objects(&activity, &association) {
                for action in graph.objects(&assoc, &had_plan) {
                    let Some(module) = graph
                        .objects(&run, &Iri::new(vocab::ODA_IS_USING))
                        .into_iter()
                        .next()
                    else {
                        tracing::debug!(%run, "oda: run uses no module, skipping");
                        continue;
                    };
                    let request = Request {
                        run: &run,
                        module: &module,
                        action: &action,
                    };
                    process_object(graph, &request);
                    process_region(graph, &request)?;
                    process_image(graph, &request)?;
                    for relation in RUN_RELATIONS {
                        graph.remove_matching(Some(&run), Some(&Iri::new(relation)), None);
                    }
                    tracing::debug!(%run, %module, %action, "oda: request linked");
                }
            }
        }
        Ok(())
    }
}
