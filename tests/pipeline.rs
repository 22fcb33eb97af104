//! End-to-end tests: provenance graph → query → annotation → cleaning →
//! diagram, against an in-memory oxigraph store.

use renku_aqs::annotate::AnnotationPipeline;
use renku_aqs::clean::clean_graph;
use renku_aqs::commands::{self, DisplayOptions};
use renku_aqs::graph::{Iri, Namespaces, ProvenanceSource, RdfSyntax, SparqlStore, Term, TripleStore};
use renku_aqs::query::build_query;
use renku_aqs::render::{DotNode, LabelTree};
use renku_aqs::vocab;

const ACTION: &str = "https://renkulab.io/plans/p1";
const INPUT: &str = "https://renkulab.io/plans/p1/inputs/notebook";
const OUTPUT: &str = "https://renkulab.io/plans/p1/outputs/result";
const MODULE: &str = "https://odahub.io/modules/SimbadClass";
const OBJECT: &str = "https://odahub.io/objects/Crab";

const FIXTURE: &str = r#"
@prefix schema: <http://schema.org/> .
@prefix prov: <http://www.w3.org/ns/prov#> .
@prefix oa: <http://www.w3.org/ns/oa#> .
@prefix renku: <https://swissdatasciencecenter.github.io/renku-ontology#> .
@prefix oda: <http://odahub.io/ontology#> .
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<https://renkulab.io/plans/p1> a schema:Action ;
    renku:command "run" ;
    renku:hasInputs <https://renkulab.io/plans/p1/inputs/notebook> ;
    renku:hasOutputs <https://renkulab.io/plans/p1/outputs/result> .

<https://renkulab.io/plans/p1/inputs/notebook> a renku:CommandInput ;
    schema:defaultValue "notebook.ipynb" .

<https://renkulab.io/plans/p1/outputs/result> a renku:CommandOutput ;
    schema:defaultValue "result.png" .

<https://renkulab.io/activities/a1> a prov:Activity ;
    prov:startedAtTime "2021-01-01T00:00:00"^^xsd:dateTime ;
    renku:parameter <https://renkulab.io/activities/a1/parameters/1> ;
    prov:qualifiedAssociation <https://renkulab.io/activities/a1/association> .

<https://renkulab.io/activities/a1/association> prov:hadPlan <https://renkulab.io/plans/p1> .

<https://renkulab.io/annotations/1> oa:hasBody <https://odahub.io/runs/r1> ;
    oa:hasTarget <https://renkulab.io/activities/a1> .

<https://odahub.io/runs/r1> a oda:Run ;
    dcterms:title "r1" ;
    oda:isUsing <https://odahub.io/modules/SimbadClass> ;
    oda:isRequestingAstroObject <https://odahub.io/objects/Crab> .

<https://odahub.io/modules/SimbadClass> a oda:AstroqueryModule ;
    dcterms:title "SimbadClass" .

<https://odahub.io/objects/Crab> a oda:AstrophysicalObject ;
    dcterms:title "Crab" .
"#;

/// A region request and an image request made during the same activity.
const REQUESTS: &str = r#"
<https://renkulab.io/annotations/2> oa:hasBody <https://odahub.io/runs/r2> ;
    oa:hasTarget <https://renkulab.io/activities/a1> .

<https://odahub.io/runs/r2> a oda:Run ;
    dcterms:title "r2" ;
    oda:isUsing <https://odahub.io/modules/SimbadRegion> ;
    oda:isRequestingAstroRegion <https://odahub.io/regions/crab-field> .

<https://odahub.io/modules/SimbadRegion> a oda:AstroqueryModule ;
    dcterms:title "SimbadRegion" .

<https://odahub.io/regions/crab-field> a oda:AstrophysicalRegion ;
    dcterms:title "crab-field" ;
    oda:isUsingSkyCoordinates <https://odahub.io/coordinates/crab-center> ;
    oda:isUsingRadius <https://odahub.io/angles/field-radius> .

<https://odahub.io/coordinates/crab-center> a oda:SkyCoordinates ;
    dcterms:title "10.5 41.2" .

<https://odahub.io/angles/field-radius> a oda:Angle ;
    dcterms:title "5 arcmin" .

<https://renkulab.io/annotations/3> oa:hasBody <https://odahub.io/runs/r3> ;
    oa:hasTarget <https://renkulab.io/activities/a1> .

<https://odahub.io/runs/r3> a oda:Run ;
    dcterms:title "r3" ;
    oda:isUsing <https://odahub.io/modules/SkyView> ;
    oda:isRequestingAstroImage <https://odahub.io/images/crab-image> .

<https://odahub.io/modules/SkyView> a oda:AstroqueryModule ;
    dcterms:title "SkyView" .

<https://odahub.io/images/crab-image> a oda:AstrophysicalImage ;
    dcterms:title "crab-image" ;
    oda:isUsingPosition <https://odahub.io/positions/crab-position> ;
    oda:isUsingRadius <https://odahub.io/angles/image-radius> ;
    oda:isUsingPixels <https://odahub.io/pixels/crab-pixels> ;
    oda:isUsingImageBand <https://odahub.io/bands/crab-band> .

<https://odahub.io/positions/crab-position> a oda:Position ;
    dcterms:title "83.63 22.01" .

<https://odahub.io/angles/image-radius> a oda:Angle ;
    dcterms:title "0.5 deg" .

<https://odahub.io/pixels/crab-pixels> a oda:Pixels ;
    dcterms:title "500 500" .

<https://odahub.io/bands/crab-band> a oda:ImageBand ;
    dcterms:title "DSS2 Red" .
"#;

/// Three positional arguments; the third has no partner.
const ARGUMENTS: &str = r#"
<https://renkulab.io/plans/p1> renku:hasArguments
    <https://renkulab.io/plans/p1/arguments/1>,
    <https://renkulab.io/plans/p1/arguments/2>,
    <https://renkulab.io/plans/p1/arguments/3> .

<https://renkulab.io/plans/p1/arguments/1> a renku:CommandParameter ;
    renku:position 1 ;
    schema:defaultValue "--radius" .

<https://renkulab.io/plans/p1/arguments/2> a renku:CommandParameter ;
    renku:position 2 ;
    schema:defaultValue "5" .

<https://renkulab.io/plans/p1/arguments/3> a renku:CommandParameter ;
    renku:position 3 ;
    schema:defaultValue "--verbose" .
"#;

fn store() -> SparqlStore {
    store_with("")
}

/// The base fixture extended with `extra` Turtle statements.
fn store_with(extra: &str) -> SparqlStore {
    let store = SparqlStore::in_memory().unwrap();
    store
        .load_str(&format!("{FIXTURE}{extra}"), RdfSyntax::Turtle)
        .unwrap();
    store
}

fn value_row(value: &str) -> String {
    format!("<tr><td align=\"center\" colspan=\"2\">{value}</td></tr>")
}

fn title_row(title: &str) -> String {
    format!("<tr><td colspan=\"2\"><B>{title}</B></td></tr>")
}

fn node<'a>(nodes: impl Iterator<Item = &'a DotNode>, iri: &str) -> &'a DotNode {
    let term = Term::iri(iri);
    nodes
        .into_iter()
        .find(|n| n.term.as_ref() == Some(&term))
        .unwrap_or_else(|| panic!("no diagram node for {iri}"))
}

fn rows(node: &DotNode) -> Vec<String> {
    let tree = LabelTree::parse(node.label.as_deref().unwrap()).unwrap();
    tree.root().elements("tr").map(|r| r.to_string()).collect()
}

#[test]
fn construct_extracts_the_workflow() {
    let query = build_query(None, false);
    let graph = store().query(&query.to_sparql()).unwrap().into_graph().unwrap();
    let action = Term::iri(ACTION);
    assert_eq!(
        graph.value(&action, &Iri::new(vocab::RENKU_COMMAND)),
        Some(Term::literal("run"))
    );
    assert!(!graph
        .objects(&Term::iri("https://odahub.io/runs/r1"), &Iri::new(vocab::OA_HAS_TARGET))
        .is_empty());
    assert_eq!(
        graph.value(&Term::iri(MODULE), &Iri::new(vocab::ODAS_AQ_MODULE)),
        Some(Term::literal("SimbadClass"))
    );
}

#[test]
fn png_output_is_styled_as_image() {
    let outcome = commands::display(&store(), &Namespaces::new(), &DisplayOptions::default()).unwrap();
    assert_eq!(
        outcome.context.type_map.get("result").map(String::as_str),
        Some("CommandOutputImage")
    );

    let output = node(outcome.diagram.nodes(), OUTPUT);
    assert_eq!(output.attr("color"), Some("#FFFFFF"));
    assert_eq!(output.attr("style"), Some("filled"));
    let tree = LabelTree::parse(output.label.as_deref().unwrap()).unwrap();
    assert_eq!(tree.root().attr("border"), Some("1"));
    assert_eq!(
        rows(output),
        vec![
            "<tr><td colspan=\"2\"><B>Image</B></td></tr>",
            "<tr><td align=\"center\" colspan=\"2\">result.png</td></tr>",
        ]
    );
}

#[test]
fn action_shows_command_then_time() {
    let outcome = commands::display(&store(), &Namespaces::new(), &DisplayOptions::default()).unwrap();
    let action = node(outcome.diagram.nodes(), ACTION);
    assert_eq!(action.attr("shape"), Some("diamond"));
    let rows = rows(action);
    assert_eq!(
        rows.first().map(String::as_str),
        Some("<tr><td align=\"center\" colspan=\"2\"><B>run</B></td></tr>")
    );
    assert_eq!(
        rows.last().map(String::as_str),
        Some("<tr><td align=\"center\" colspan=\"2\">2021-01-01 00:00:00</td></tr>")
    );
}

#[test]
fn input_and_module_styling() {
    let outcome = commands::display(&store(), &Namespaces::new(), &DisplayOptions::default()).unwrap();
    let input = node(outcome.diagram.nodes(), INPUT);
    assert_eq!(input.attr("color"), Some("#DBA3BC"));
    assert_eq!(
        rows(input),
        vec!["<tr><td align=\"center\" colspan=\"2\"><B><I>notebook.ipynb</I></B></td></tr>"]
    );
    let module = node(outcome.diagram.nodes(), MODULE);
    assert_eq!(module.attr("shape"), Some("ellipse"));
    assert_eq!(module.attr("color"), Some("#00CC00"));
}

#[test]
fn module_is_linked_to_action_and_object() {
    let outcome = commands::display(&store(), &Namespaces::new(), &DisplayOptions::default()).unwrap();
    let module = Term::iri(MODULE);
    assert_eq!(
        outcome.graph.objects(&module, &Iri::new(vocab::ODA_IS_USED_DURING)),
        vec![Term::iri(ACTION)]
    );
    assert_eq!(
        outcome.graph.objects(&module, &Iri::new(vocab::ODA_REQUESTS_ASTRO_OBJECT)),
        vec![Term::iri(OBJECT)]
    );
    assert_eq!(
        outcome.graph.value(&Term::iri(ACTION), &Iri::new(vocab::PROV_STARTED_AT_TIME)).map(|t| t.lexical().to_string()),
        Some("2021-01-01T00:00:00".to_string())
    );
    assert!(outcome
        .graph
        .triples_matching(None, Some(&Iri::new(vocab::RDF_TYPE)), None)
        .is_empty());
}

#[test]
fn edges_carry_local_names() {
    let outcome = commands::display(&store(), &Namespaces::new(), &DisplayOptions::default()).unwrap();
    let labels: Vec<String> = outcome
        .diagram
        .edges()
        .filter_map(|e| e.label.as_deref())
        .map(|l| LabelTree::parse(l).unwrap().root().text().unwrap_or_default().to_string())
        .collect();
    assert!(labels.contains(&"isUsedDuring".to_string()));
    assert!(labels.contains(&"hasOutputs".to_string()));
    assert!(labels.iter().all(|l| !l.contains(':')));
}

#[test]
fn cleaning_after_annotation_is_idempotent() {
    let query = build_query(None, false);
    let mut graph = store().query(&query.to_sparql()).unwrap().into_graph().unwrap();
    AnnotationPipeline::standard().run(&mut graph).unwrap();
    assert!(clean_graph(&mut graph) > 0);
    let once = graph.clone();
    assert_eq!(clean_graph(&mut graph), 0);
    assert_eq!(graph, once);
}

#[test]
fn no_oda_info_leaves_out_requests() {
    let options = DisplayOptions {
        no_oda_info: true,
        ..DisplayOptions::default()
    };
    let outcome = commands::display(&store(), &Namespaces::new(), &options).unwrap();
    assert!(outcome
        .graph
        .triples_matching(Some(&Term::iri(MODULE)), None, None)
        .is_empty());
    assert!(outcome.diagram.nodes().all(|n| n.term != Some(Term::iri(MODULE))));
}

#[test]
fn input_selector_filters_workflows() {
    let matching = DisplayOptions {
        input_notebook: Some("notebook.ipynb".into()),
        ..DisplayOptions::default()
    };
    let outcome = commands::display(&store(), &Namespaces::new(), &matching).unwrap();
    assert!(!outcome.graph.is_empty());

    let other = DisplayOptions {
        input_notebook: Some("other.ipynb".into()),
        ..DisplayOptions::default()
    };
    let outcome = commands::display(&store(), &Namespaces::new(), &other).unwrap();
    assert!(outcome.graph.is_empty());
    assert_eq!(outcome.diagram.node_count(), 0);
}

#[test]
fn leaderboard_counts_requests() {
    let entries = commands::leaderboard(&store(), &Namespaces::new()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].module, "SimbadClass");
    assert_eq!(entries[0].object, "Crab");
    assert_eq!(entries[0].requests, 1);
}

#[test]
fn params_lists_runs_and_writes_subgraph() {
    let report = commands::params(&store(), &Namespaces::new()).unwrap();
    assert_eq!(report.invalid, 0);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].run_id, "a1");
    assert_eq!(report.rows[0].module, "SimbadClass");
    assert_eq!(report.rows[0].object, "Crab");

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("subgraph.ttl");
    let text = commands::write_subgraph(&report.subgraph, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    assert!(text.contains("Crab"));
}

#[test]
fn missing_provenance_graph_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("provenance.json");
    let err = SparqlStore::from_files(&[missing]).unwrap_err();
    assert!(matches!(
        err,
        renku_aqs::error::GraphError::ProvenanceGraphMissing { .. }
    ));
}

#[test]
fn provenance_graph_loads_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("provenance.ttl");
    std::fs::write(&path, FIXTURE).unwrap();
    let config = renku_aqs::config::AqsConfig {
        provenance_graph: path,
        ..Default::default()
    };
    let store = commands::open_provenance(&config, &[]).unwrap();
    assert!(!store.is_empty().unwrap());
}

#[test]
fn region_request_values_reach_the_diagram() {
    let outcome = commands::display(&store_with(REQUESTS), &Namespaces::new(), &DisplayOptions::default()).unwrap();
    let module = Term::iri("https://odahub.io/modules/SimbadRegion");
    let region = "https://odahub.io/regions/crab-field";
    assert_eq!(
        outcome.graph.objects(&module, &Iri::new(vocab::ODA_REQUESTS_ASTRO_REGION)),
        vec![Term::iri(region)]
    );
    assert_eq!(
        outcome.graph.objects(&module, &Iri::new(vocab::ODA_IS_USED_DURING)),
        vec![Term::iri(ACTION)]
    );

    let center = node(outcome.diagram.nodes(), "https://odahub.io/coordinates/crab-center");
    assert_eq!(center.attr("color"), Some("#1B81FB"));
    assert_eq!(
        rows(center),
        vec![title_row("SkyCoordinates"), value_row("RA=10.5 deg  Dec=41.2 deg")]
    );
    let radius = node(outcome.diagram.nodes(), "https://odahub.io/angles/field-radius");
    assert_eq!(rows(radius), vec![title_row("Angle"), value_row("5.0 arcmin")]);

    let region = node(outcome.diagram.nodes(), region);
    assert_eq!(region.attr("shape"), Some("ellipse"));
    assert_eq!(region.attr("color"), Some("#6262bf"));
}

#[test]
fn image_request_values_reach_the_diagram() {
    let outcome = commands::display(&store_with(REQUESTS), &Namespaces::new(), &DisplayOptions::default()).unwrap();
    let module = Term::iri("https://odahub.io/modules/SkyView");
    assert_eq!(
        outcome.graph.objects(&module, &Iri::new(vocab::ODA_REQUESTS_ASTRO_IMAGE)),
        vec![Term::iri("https://odahub.io/images/crab-image")]
    );

    let expected = [
        ("https://odahub.io/positions/crab-position", "Position", "22.01 83.63 unit=deg"),
        ("https://odahub.io/angles/image-radius", "Angle", "30.0 unit=arcmin"),
        ("https://odahub.io/pixels/crab-pixels", "Pixels", "500,500"),
        ("https://odahub.io/bands/crab-band", "ImageBand", "DSS2 Red"),
    ];
    for (iri, type_name, value) in expected {
        let field = node(outcome.diagram.nodes(), iri);
        assert_eq!(rows(field), vec![title_row(type_name), value_row(value)], "{iri}");
    }
    let image = node(outcome.diagram.nodes(), "https://odahub.io/images/crab-image");
    assert_eq!(image.attr("color"), Some("#6262bg"));
}

#[test]
fn arguments_are_paired_into_parameters() {
    let outcome = commands::display(&store_with(ARGUMENTS), &Namespaces::new(), &DisplayOptions::default()).unwrap();
    let minted = Term::iri("https://renkulab.io/plans/p1/parameters/--radius_5");
    assert_eq!(
        outcome.graph.subjects(&Iri::new(vocab::RENKU_IS_ARGUMENT_OF), &Term::iri(ACTION)),
        vec![minted.clone()]
    );
    assert_eq!(
        outcome.graph.value(&minted, &Iri::new(vocab::SCHEMA_DEFAULT_VALUE)),
        Some(Term::literal("--radius 5"))
    );
    for i in 1..=3 {
        let argument = Term::iri(format!("https://renkulab.io/plans/p1/arguments/{i}"));
        assert!(outcome
            .graph
            .objects(&argument, &Iri::new(vocab::SCHEMA_DEFAULT_VALUE))
            .is_empty());
    }

    let parameter = node(outcome.diagram.nodes(), minted.lexical());
    assert_eq!(parameter.attr("color"), Some("#6262be"));
    assert_eq!(parameter.attr("style"), Some("filled"));
    assert_eq!(rows(parameter), vec![title_row("--radius"), value_row("5")]);
    assert!(outcome
        .diagram
        .nodes()
        .all(|n| !n.label.as_deref().unwrap_or_default().contains("--verbose")));
}
