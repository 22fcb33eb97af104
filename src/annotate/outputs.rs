use std::path::Path;

use super::{AnnotationContext, Footprint, Stage, StageKind, single, type_name};
use crate::error::AnnotateResult;
use crate::graph::{Iri, Term, Triple, TripleStore};
use crate::vocab;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "bmp"];

/// The refined output type implied by a file name, if any. Extensions are
/// matched case-sensitively.
pub fn classify_output(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?;
    if IMAGE_EXTENSIONS.contains(&extension) {
        Some(vocab::RENKU_COMMAND_OUTPUT_IMAGE)
    } else if extension == "fits" {
        Some(vocab::RENKU_COMMAND_OUTPUT_FITS_FILE)
    } else if extension == "ipynb" {
        Some(vocab::RENKU_COMMAND_OUTPUT_NOTEBOOK)
    } else {
        None
    }
}

/// Retypes outputs by the extension of their single default value.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputAnalysis;

impl Stage for OutputAnalysis {
    fn kind(&self) -> StageKind {
        StageKind::Outputs
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            reads: &[vocab::RENKU_HAS_OUTPUTS, vocab::SCHEMA_DEFAULT_VALUE],
            deletes: &[vocab::RDF_TYPE],
        }
    }

    fn run(&self, graph: &mut dyn TripleStore, ctx: &mut AnnotationContext) -> AnnotateResult<()> {
        let rdf_type = Iri::new(vocab::RDF_TYPE);
        let default_value = Iri::new(vocab::SCHEMA_DEFAULT_VALUE);
        for (action, output) in graph.subject_objects(&Iri::new(vocab::RENKU_HAS_OUTPUTS)) {
            let action_label = graph.label(&action);
            ctx.output_values.entry(action_label.clone()).or_default();
            let Some(value) = single(graph.objects(&output, &default_value), "defaultValue", &output)
            else {
                continue;
            };
            if let Some(refined) = classify_output(value.lexical()) {
                graph.remove_matching(Some(&output), Some(&rdf_type), None);
                graph.insert(Triple::new(output.clone(), rdf_type.clone(), Term::iri(refined)));
                let name = type_name(graph, refined);
                tracing::debug!(%output, %name, "outputs: retyped");
                ctx.type_map.insert(graph.label(&output), name);
            }
            ctx.output_values.entry(action_label).or_default().push(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraph;

    fn graph_with_output(value: &str) -> (MemoryGraph, Term) {
        let action = Term::iri("https://e.org/plan");
        let output = Term::iri("https://e.org/plan/outputs/1");
        let graph = MemoryGraph::from_triples([
            Triple::new(action, vocab::RENKU_HAS_OUTPUTS, output.clone()),
            Triple::new(
                output.clone(),
                vocab::RDF_TYPE,
                Term::iri(vocab::RENKU_COMMAND_OUTPUT),
            ),
            Triple::new(output.clone(), vocab::SCHEMA_DEFAULT_VALUE, Term::literal(value)),
        ]);
        (graph, output)
    }

    fn types_after(value: &str) -> Vec<Term> {
        let (mut graph, output) = graph_with_output(value);
        OutputAnalysis
            .run(&mut graph, &mut AnnotationContext::default())
            .unwrap();
        graph.objects(&output, &Iri::new(vocab::RDF_TYPE))
    }

    #[test]
    fn classification() {
        assert_eq!(classify_output("a/b/plot.jpeg"), Some(vocab::RENKU_COMMAND_OUTPUT_IMAGE));
        assert_eq!(classify_output("cube.fits"), Some(vocab::RENKU_COMMAND_OUTPUT_FITS_FILE));
        assert_eq!(classify_output("out.ipynb"), Some(vocab::RENKU_COMMAND_OUTPUT_NOTEBOOK));
        assert_eq!(classify_output("table.csv"), None);
        assert_eq!(classify_output("PLOT.PNG"), None);
        assert_eq!(classify_output("noext"), None);
    }

    #[test]
    fn image_output_is_retyped_exactly_once() {
        for ext in IMAGE_EXTENSIONS {
            assert_eq!(
                types_after(&format!("result.{ext}")),
                vec![Term::iri(vocab::RENKU_COMMAND_OUTPUT_IMAGE)]
            );
        }
        assert_eq!(
            types_after("cube.fits"),
            vec![Term::iri(vocab::RENKU_COMMAND_OUTPUT_FITS_FILE)]
        );
    }

    #[test]
    fn other_extensions_keep_their_type() {
        assert_eq!(
            types_after("table.csv"),
            vec![Term::iri(vocab::RENKU_COMMAND_OUTPUT)]
        );
    }

    #[test]
    fn type_map_follows_retyping() {
        let (mut graph, _) = graph_with_output("result.png");
        let mut ctx = AnnotationContext::default();
        ctx.type_map.insert("1".into(), "CommandOutput".into());
        OutputAnalysis.run(&mut graph, &mut ctx).unwrap();
        assert_eq!(ctx.type_map["1"], "CommandOutputImage");
        assert_eq!(ctx.output_values["plan"], vec![Term::literal("result.png")]);
    }

    #[test]
    fn ambiguous_default_value_is_skipped() {
        let (mut graph, output) = graph_with_output("result.png");
        graph.insert(Triple::new(
            output.clone(),
            vocab::SCHEMA_DEFAULT_VALUE,
            Term::literal("other.png"),
        ));
        OutputAnalysis
            .run(&mut graph, &mut AnnotationContext::default())
            .unwrap();
        assert_eq!(
            graph.objects(&output, &Iri::new(vocab::RDF_TYPE)),
            vec![Term::iri(vocab::RENKU_COMMAND_OUTPUT)]
        );
    }
}
