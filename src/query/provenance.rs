//! The CONSTRUCT query that carves one workflow's subgraph out of the
//! provenance graph: the action with its arguments, inputs and outputs, the
//! activity that executed it, and the astroquery request attached to the run.

use super::{
    ConstructTemplate, Expr, GroupPattern, PropertyPath, QueryTerm, SubjectBlock, Verb,
    WhereClause,
};
use crate::vocab;

fn var(name: &str) -> QueryTerm {
    QueryTerm::var(name)
}

fn iri(iri: &str) -> QueryTerm {
    QueryTerm::iri(iri)
}

fn block(subject: &str) -> SubjectBlock {
    SubjectBlock::new(var(subject))
}

/// `?node a ?type ; dcterms:title ?name .`
fn titled(subject: &str, type_var: &str, name_var: &str) -> SubjectBlock {
    block(subject)
        .typed(var(type_var))
        .with(vocab::DCTERMS_TITLE, var(name_var))
}

/// Both fragments of the provenance subgraph query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceQuery {
    pub construct: ConstructTemplate,
    pub where_clause: WhereClause,
}

impl ProvenanceQuery {
    /// The complete `CONSTRUCT { ... } WHERE { ... }` text.
    pub fn to_sparql(&self) -> String {
        format!("{}\n{}", self.construct, self.where_clause)
    }
}

/// Build both fragments for `selector` (an input's default value, e.g. a
/// notebook name) and the oda suppression flag.
pub fn build_query(selector: Option<&str>, no_oda_info: bool) -> ProvenanceQuery {
    ProvenanceQuery {
        construct: build_query_construct(selector, no_oda_info),
        where_clause: build_query_where(selector),
    }
}

/// The WHERE clause: the action group, then the activity group carrying a
/// union over the three astroquery request shapes.
pub fn build_query_where(selector: Option<&str>) -> WhereClause {
    WhereClause::new(vec![
        GroupPattern::Group(action_patterns(selector)),
        GroupPattern::Group(activity_patterns()),
    ])
}

fn action_patterns(selector: Option<&str>) -> Vec<GroupPattern> {
    let mut patterns = Vec::new();
    let param_types = match selector {
        Some(selector) => {
            patterns.push(
                block("action")
                    .typed(iri(vocab::SCHEMA_ACTION))
                    .with(vocab::RENKU_HAS_INPUTS, var("actionParamInput"))
                    .with(vocab::RENKU_COMMAND, var("actionCommand"))
                    .with(Verb::Var("has".into()), var("actionParam"))
                    .into(),
            );
            patterns.push(
                block("actionParamInput")
                    .typed(var("actionParamInputType"))
                    .with(vocab::SCHEMA_DEFAULT_VALUE, QueryTerm::literal(selector))
                    .into(),
            );
            patterns.push(GroupPattern::Filter(Expr::Equals(
                var("actionParamInputType"),
                iri(vocab::RENKU_COMMAND_INPUT),
            )));
            patterns.push(GroupPattern::Filter(Expr::In(
                var("has"),
                vec![iri(vocab::RENKU_HAS_ARGUMENTS), iri(vocab::RENKU_HAS_OUTPUTS)],
            )));
            vec![
                iri(vocab::RENKU_COMMAND_OUTPUT),
                iri(vocab::RENKU_COMMAND_PARAMETER),
            ]
        }
        None => {
            patterns.push(
                block("action")
                    .typed(iri(vocab::SCHEMA_ACTION))
                    .with(vocab::RENKU_COMMAND, var("actionCommand"))
                    .with(Verb::Var("has".into()), var("actionParam"))
                    .into(),
            );
            patterns.push(GroupPattern::Filter(Expr::In(
                var("has"),
                vec![
                    iri(vocab::RENKU_HAS_ARGUMENTS),
                    iri(vocab::RENKU_HAS_OUTPUTS),
                    iri(vocab::RENKU_HAS_INPUTS),
                ],
            )));
            vec![
                iri(vocab::RENKU_COMMAND_OUTPUT),
                iri(vocab::RENKU_COMMAND_PARAMETER),
                iri(vocab::RENKU_COMMAND_INPUT),
            ]
        }
    };
    patterns.push(
        block("actionParam")
            .typed(var("actionParamType"))
            .with(vocab::SCHEMA_DEFAULT_VALUE, var("actionParamValue"))
            .into(),
    );
    patterns.push(GroupPattern::Filter(Expr::In(var("actionParamType"), param_types)));
    patterns.push(GroupPattern::Optional(vec![
        block("actionParam")
            .with(vocab::RENKU_POSITION, var("actionPosition"))
            .into(),
    ]));
    patterns
}

fn activity_patterns() -> Vec<GroupPattern> {
    vec![
        block("activity")
            .typed(var("activityType"))
            .with(vocab::PROV_STARTED_AT_TIME, var("activityTime"))
            .with(vocab::RENKU_PARAMETER, var("parameter_value"))
            .with(vocab::PROV_QUALIFIED_ASSOCIATION, var("activity_qualified_association"))
            .into(),
        block("activity_qualified_association")
            .with(vocab::PROV_HAD_PLAN, var("action"))
            .into(),
        GroupPattern::Union(vec![object_request(), region_request(), image_request()]),
    ]
}

/// `?run oda:isUsing ?aq_module ; <request> ?target ; a ?run_rdf_type` plus the
/// annotation links back to the activity.
fn run_block(request: &str, target: &str) -> GroupPattern {
    let annotated = || PropertyPath::inverse_then(vocab::OA_HAS_BODY, vocab::OA_HAS_TARGET);
    block("run")
        .with(vocab::ODA_IS_USING, var("aq_module"))
        .with(request, var(target))
        .typed(var("run_rdf_type"))
        .with(annotated(), var("runId"))
        .with(annotated(), var("activity"))
        .into()
}

fn run_title() -> GroupPattern {
    GroupPattern::Optional(vec![
        block("run").with(vocab::DCTERMS_TITLE, var("run_title")).into(),
    ])
}

fn object_request() -> Vec<GroupPattern> {
    vec![
        run_block(vocab::ODA_IS_REQUESTING_ASTRO_OBJECT, "a_object"),
        titled("aq_module", "aq_mod_rdf_type", "aq_module_name").into(),
        titled("a_object", "a_obj_rdf_type", "a_object_name").into(),
        run_title(),
        GroupPattern::Filter(Expr::NotContains(var("a_object"), " ".into())),
    ]
}

fn region_request() -> Vec<GroupPattern> {
    vec![
        run_block(vocab::ODA_IS_REQUESTING_ASTRO_REGION, "a_region"),
        titled("aq_module", "aq_mod_rdf_type", "aq_module_name").into(),
        titled("a_region", "a_region_type", "a_region_name")
            .with(vocab::ODA_IS_USING_SKY_COORDINATES, var("a_sky_coordinates"))
            .with(vocab::ODA_IS_USING_RADIUS, var("a_radius"))
            .into(),
        titled("a_sky_coordinates", "a_sky_coordinates_type", "a_sky_coordinates_name").into(),
        titled("a_radius", "a_radius_type", "a_radius_name").into(),
        run_title(),
    ]
}

/// Every image sub-field is optional on its own.
const IMAGE_FIELDS: [(&str, &str); 5] = [
    (vocab::ODA_IS_USING_COORDINATES, "a_coordinates"),
    (vocab::ODA_IS_USING_POSITION, "a_position"),
    (vocab::ODA_IS_USING_RADIUS, "a_radius"),
    (vocab::ODA_IS_USING_PIXELS, "a_pixels"),
    (vocab::ODA_IS_USING_IMAGE_BAND, "a_image_band"),
];

fn image_request() -> Vec<GroupPattern> {
    let mut patterns = vec![
        run_block(vocab::ODA_IS_REQUESTING_ASTRO_IMAGE, "a_image"),
        titled("aq_module", "aq_mod_rdf_type", "aq_module_name").into(),
        titled("a_image", "a_image_type", "a_image_name").into(),
    ];
    for (predicate, node) in IMAGE_FIELDS {
        patterns.push(GroupPattern::Optional(vec![
            block("a_image").with(predicate, var(node)).into(),
            titled(node, &format!("{node}_type"), &format!("{node}_name")).into(),
        ]));
    }
    patterns.push(run_title());
    patterns
}

/// The CONSTRUCT template. Action, parameter and activity-time triples are
/// always present; the astroquery request triples unless `no_oda_info`.
pub fn build_query_construct(selector: Option<&str>, no_oda_info: bool) -> ConstructTemplate {
    let mut action = block("action")
        .typed(iri(vocab::SCHEMA_ACTION))
        .with(vocab::RENKU_COMMAND, var("actionCommand"));
    let mut blocks = Vec::new();
    if let Some(selector) = selector {
        action = action.with(vocab::RENKU_HAS_INPUTS, var("actionParamInput"));
        blocks.push(
            block("actionParamInput")
                .typed(var("actionParamInputType"))
                .with(vocab::SCHEMA_DEFAULT_VALUE, QueryTerm::literal(selector)),
        );
    }
    blocks.insert(0, action.with(Verb::Var("has".into()), var("actionParam")));
    blocks.push(
        block("actionParam")
            .typed(var("actionParamType"))
            .with(vocab::RENKU_POSITION, var("actionPosition"))
            .with(vocab::SCHEMA_DEFAULT_VALUE, var("actionParamValue")),
    );
    blocks.push(
        block("activity")
            .typed(var("activityType"))
            .with(vocab::PROV_STARTED_AT_TIME, var("activityTime"))
            .with(vocab::PROV_QUALIFIED_ASSOCIATION, var("activity_qualified_association")),
    );
    blocks.push(block("activity_qualified_association").with(vocab::PROV_HAD_PLAN, var("action")));

    let mut template = ConstructTemplate::new(blocks);
    if !no_oda_info {
        template.extend(oda_construct());
    }
    template
}

fn oda_construct() -> Vec<SubjectBlock> {
    let mut blocks = vec![
        block("run")
            .with(vocab::ODA_IS_REQUESTING_ASTRO_OBJECT, var("a_object"))
            .with(vocab::ODA_IS_REQUESTING_ASTRO_REGION, var("a_region"))
            .with(vocab::ODA_IS_REQUESTING_ASTRO_IMAGE, var("a_image"))
            .with(vocab::DCTERMS_TITLE, var("run_title"))
            .with(vocab::ODA_IS_USING, var("aq_module"))
            .with(vocab::OA_HAS_TARGET, var("activity"))
            .typed(var("run_rdf_type")),
        block("aq_module")
            .with(vocab::ODAS_AQ_MODULE, var("aq_module_name"))
            .typed(var("aq_mod_rdf_type")),
        block("a_object")
            .with(vocab::ODAS_ASTRO_OBJECT, var("a_object_name"))
            .typed(var("a_obj_rdf_type")),
        titled("a_region", "a_region_type", "a_region_name")
            .with(vocab::ODA_IS_USING_SKY_COORDINATES, var("a_sky_coordinates"))
            .with(vocab::ODA_IS_USING_RADIUS, var("a_radius")),
    ];
    let mut image = titled("a_image", "a_image_type", "a_image_name");
    for (predicate, node) in IMAGE_FIELDS {
        image = image.with(predicate, var(node));
    }
    blocks.push(image);
    for node in [
        "a_pixels",
        "a_image_band",
        "a_coordinates",
        "a_sky_coordinates",
        "a_position",
        "a_radius",
    ] {
        blocks.push(titled(node, &format!("{node}_type"), &format!("{node}_name")));
    }
    blocks
}
