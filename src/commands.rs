//! The command workflows behind the CLI: leaderboard, params and display.
//! Each returns data; printing is left to the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::annotate::{AnnotationContext, AnnotationPipeline};
use crate::clean::clean_graph;
use crate::config::AqsConfig;
use crate::error::{AqsResult, CommandError, CommandResult, GraphError};
use crate::graph::sparql::serialize_graph;
use crate::graph::{
    MemoryGraph, Namespaces, ProvenanceSource, RdfSyntax, SparqlStore, Term, TripleStore,
};
use crate::query::{build_query, requests};
use crate::render::{DotGraph, StyleTable, customize_graph, rdf_to_dot};

/// How tabular command output is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Ascii,
    Json,
}

/// Open the provenance graph: `paths` if any were given, else the configured
/// default.
pub fn open_provenance(config: &AqsConfig, paths: &[PathBuf]) -> AqsResult<SparqlStore> {
    let paths = if paths.is_empty() {
        vec![config.provenance_graph.clone()]
    } else {
        paths.to_vec()
    };
    let store = SparqlStore::from_files(&paths)?;
    tracing::info!(files = paths.len(), quads = store.len()?, "provenance graph loaded");
    Ok(store)
}

/// Local name of an IRI, or its lexical form.
fn short_name(namespaces: &Namespaces, term: &Term) -> String {
    match term {
        Term::Iri(iri) => namespaces
            .compute_qname(iri.as_str())
            .map_or_else(|| iri.as_str().to_string(), |q| q.local),
        other => other.lexical().to_string(),
    }
}

/// Last path segment of a run IRI.
pub fn run_id(run: &str) -> &str {
    run.rsplit('/').next().unwrap_or(run)
}

/// Box-drawn ASCII table.
pub fn ascii_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let rule: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";
    let line = |cells: Vec<&str>| -> String {
        let mut out = String::new();
        for (cell, width) in cells.iter().zip(&widths) {
            let width = *width;
            out.push_str(&format!("| {cell:<width$} "));
        }
        out.push_str("|\n");
        out
    };

    let mut out = rule.clone();
    out.push_str(&line(headers.to_vec()));
    out.push_str(&rule);
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out.push_str(&rule);
    out
}

// ---------------------------------------------------------------------------
// leaderboard
// ---------------------------------------------------------------------------

/// How often one module was used to request one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub module: String,
    pub object: String,
    pub requests: usize,
}

/// Request counts per (module, object), most requested first.
pub fn leaderboard(source: &dyn ProvenanceSource, namespaces: &Namespaces) -> AqsResult<Vec<LeaderboardEntry>> {
    let rows = source
        .query(&requests::leaderboard_query().to_string())?
        .into_solutions()?;
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for row in &rows {
        let (Some(module), Some(object)) = (row.get("aq_module"), row.get("a_object")) else {
            continue;
        };
        *counts
            .entry((short_name(namespaces, module), short_name(namespaces, object)))
            .or_default() += 1;
    }
    let mut entries: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|((module, object), requests)| LeaderboardEntry {
            module,
            object,
            requests,
        })
        .collect();
    entries.sort_by(|a, b| b.requests.cmp(&a.requests));
    tracing::info!(entries = entries.len(), "leaderboard: computed");
    Ok(entries)
}

/// Pretty-printed JSON of `value`.
fn to_json<T: Serialize + ?Sized>(what: &str, value: &T) -> CommandResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CommandError::Json {
        what: what.to_string(),
        message: e.to_string(),
    })
}

pub fn format_leaderboard(entries: &[LeaderboardEntry], format: OutputFormat) -> CommandResult<String> {
    match format {
        OutputFormat::Json => to_json("leaderboard", entries),
        OutputFormat::Ascii => {
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| vec![e.module.clone(), e.object.clone(), e.requests.to_string()])
                .collect();
            Ok(ascii_table(&["Module", "Astro Object", "Requests"], &rows))
        }
    }
}

// ---------------------------------------------------------------------------
// params
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamsRow {
    pub run_id: String,
    pub module: String,
    pub object: String,
}

/// Object requests found in the provenance graph.
#[derive(Debug, Clone)]
pub struct ParamsReport {
    pub rows: Vec<ParamsRow>,
    /// Requests whose object IRI contains a space.
    pub invalid: usize,
    /// Triples of every valid request's run.
    pub subgraph: MemoryGraph,
}

pub fn params(source: &dyn ProvenanceSource, namespaces: &Namespaces) -> AqsResult<ParamsReport> {
    let solutions = source
        .query(&requests::params_select().to_string())?
        .into_solutions()?;
    let mut rows = Vec::new();
    let mut invalid = 0;
    for row in &solutions {
        let Some(object) = row.get("a_object") else {
            continue;
        };
        if object.lexical().contains(' ') {
            invalid += 1;
            continue;
        }
        let text = |var: &str| row.get(var).map(|t| t.lexical().to_string()).unwrap_or_default();
        rows.push(ParamsRow {
            run_id: run_id(&text("runId")).to_string(),
            module: text("aq_module_name"),
            object: text("a_object_name"),
        });
    }
    if invalid > 0 {
        tracing::warn!(invalid, "params: invalid entries found, the store should be recreated");
    }

    let mut subgraph = source.query(&requests::params_construct())?.into_graph()?;
    *subgraph.namespaces_mut() = namespaces.clone();
    tracing::info!(rows = rows.len(), triples = subgraph.len(), "params: collected");
    Ok(ParamsReport {
        rows,
        invalid,
        subgraph,
    })
}

pub fn format_params(rows: &[ParamsRow], format: OutputFormat) -> CommandResult<String> {
    match format {
        OutputFormat::Json => to_json("params", rows),
        OutputFormat::Ascii => {
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|r| vec![r.run_id.clone(), r.module.clone(), r.object.clone()])
                .collect();
            Ok(ascii_table(&["Run ID", "AstroQuery Module", "Astro Object"], &cells))
        }
    }
}

// ---------------------------------------------------------------------------
// display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    /// Only runs whose action reads an input with this default value.
    pub input_notebook: Option<String>,
    pub no_oda_info: bool,
}

/// Everything the display pipeline produced.
#[derive(Debug)]
pub struct DisplayOutcome {
    /// The annotated and cleaned subgraph.
    pub graph: MemoryGraph,
    pub context: AnnotationContext,
    /// Transient triples the cleaner removed.
    pub removed: usize,
    pub diagram: DotGraph,
}

/// Query → annotate → clean → draw → restyle.
pub fn display(
    source: &dyn ProvenanceSource,
    namespaces: &Namespaces,
    options: &DisplayOptions,
) -> AqsResult<DisplayOutcome> {
    let query = build_query(options.input_notebook.as_deref(), options.no_oda_info);
    tracing::debug!(query = %query.to_sparql(), "display: provenance query");
    let mut graph = source.query(&query.to_sparql())?.into_graph()?;
    *graph.namespaces_mut() = namespaces.clone();
    tracing::info!(triples = graph.len(), "display: subgraph extracted");

    let context = AnnotationPipeline::standard().run(&mut graph)?;
    let removed = clean_graph(&mut graph);

    let mut diagram = rdf_to_dot(&graph);
    customize_graph(&mut diagram, &context.type_map, &StyleTable::standard())?;
    Ok(DisplayOutcome {
        graph,
        context,
        removed,
        diagram,
    })
}

/// Write `graph` as Turtle to `path`, returning the text.
pub fn write_subgraph(graph: &MemoryGraph, path: &Path) -> AqsResult<String> {
    let text = serialize_graph(graph, RdfSyntax::Turtle)?;
    std::fs::write(path, &text).map_err(|e| GraphError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), triples = graph.len(), "subgraph written");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Literal, Solution};
    use crate::graph::sparql::QueryOutcome;

    #[test]
    fn run_id_is_last_segment() {
        assert_eq!(run_id("https://renkulab.io/activities/abc123"), "abc123");
        assert_eq!(run_id("abc"), "abc");
    }

    #[test]
    fn ascii_table_pads_columns() {
        let table = ascii_table(&["A", "Long"], &[vec!["xyz".into(), "1".into()]]);
        assert_eq!(
            table,
            "+-----+------+\n| A   | Long |\n+-----+------+\n| xyz | 1    |\n+-----+------+\n"
        );
    }

    struct Canned(Vec<Solution>);

    impl ProvenanceSource for Canned {
        fn query(&self, _sparql: &str) -> crate::error::GraphResult<QueryOutcome> {
            Ok(QueryOutcome::Solutions(self.0.clone()))
        }

        fn serialize(&self, _syntax: RdfSyntax) -> crate::error::GraphResult<String> {
            Ok(String::new())
        }
    }

    fn solution(run: &str, object: &str, module: &str) -> Solution {
        [
            ("run", Term::iri(run)),
            ("a_object", Term::iri(object)),
            ("aq_module", Term::iri(module)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn leaderboard_ranks_by_count() {
        let source = Canned(vec![
            solution("https://e.org/r1", "https://odahub.io/ontology#Mrk421", "https://odahub.io/ontology#SimbadClass"),
            solution("https://e.org/r2", "https://odahub.io/ontology#Crab", "https://odahub.io/ontology#SimbadClass"),
            solution("https://e.org/r3", "https://odahub.io/ontology#Crab", "https://odahub.io/ontology#SimbadClass"),
        ]);
        let entries = leaderboard(&source, &Namespaces::new()).unwrap();
        assert_eq!(
            entries[0],
            LeaderboardEntry {
                module: "SimbadClass".into(),
                object: "Crab".into(),
                requests: 2,
            }
        );
        assert_eq!(entries[1].requests, 1);
        let json = format_leaderboard(&entries, OutputFormat::Json).unwrap();
        assert!(json.contains("\"requests\": 2"));
    }

    #[test]
    fn params_format_both_ways() {
        let rows = vec![ParamsRow {
            run_id: "a1".into(),
            module: "SimbadClass".into(),
            object: "Crab".into(),
        }];
        let json = format_params(&rows, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["run_id"], "a1");
        let table = format_params(&rows, OutputFormat::Ascii).unwrap();
        assert!(table.contains("| a1     | SimbadClass       | Crab         |"));
    }

    #[test]
    fn short_name_of_literal_is_lexical() {
        let term = Term::Literal(Literal::simple("Mrk 421"));
        assert_eq!(short_name(&Namespaces::new(), &term), "Mrk 421");
    }
}
