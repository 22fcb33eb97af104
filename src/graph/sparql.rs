//! SPARQL-capable provenance store backed by oxigraph.
//!
//! Loads the provenance graph produced by the workflow tool and answers the
//! CONSTRUCT/SELECT queries the pipeline issues. Also bridges oxigraph's term
//! model to ours for serializing a [`MemoryGraph`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{
    BlankNode, Literal as OxLiteral, NamedNode, Term as OxTerm, Triple as OxTriple,
};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::{GraphError, GraphResult};

use super::{Iri, Literal, MemoryGraph, Term, Triple, TripleStore};

/// One row of a SELECT result: variable name → bound term.
pub type Solution = BTreeMap<String, Term>;

/// The result of running a SPARQL query.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Solutions(Vec<Solution>),
    Graph(MemoryGraph),
    Boolean(bool),
}

impl QueryOutcome {
    /// The constructed graph, or an error for SELECT/ASK results.
    pub fn into_graph(self) -> GraphResult<MemoryGraph> {
        match self {
            Self::Graph(graph) => Ok(graph),
            _ => Err(GraphError::Sparql {
                message: "expected a CONSTRUCT/DESCRIBE result".into(),
            }),
        }
    }

    /// The solution rows, or an error for CONSTRUCT/ASK results.
    pub fn into_solutions(self) -> GraphResult<Vec<Solution>> {
        match self {
            Self::Solutions(rows) => Ok(rows),
            _ => Err(GraphError::Sparql {
                message: "expected a SELECT result".into(),
            }),
        }
    }
}

/// Textual RDF syntaxes a graph can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfSyntax {
    Turtle,
    NTriples,
    RdfXml,
}

impl RdfSyntax {
    fn format(self) -> RdfFormat {
        match self {
            Self::Turtle => RdfFormat::Turtle,
            Self::NTriples => RdfFormat::NTriples,
            Self::RdfXml => RdfFormat::RdfXml,
        }
    }
}

/// The provenance graph as supplied by the workflow tool: something that
/// answers SPARQL and can dump itself.
pub trait ProvenanceSource {
    fn query(&self, sparql: &str) -> GraphResult<QueryOutcome>;

    fn serialize(&self, syntax: RdfSyntax) -> GraphResult<String>;
}

/// SPARQL-capable RDF store holding the provenance graph.
pub struct SparqlStore {
    store: Store,
}

impl SparqlStore {
    /// Create a new empty in-memory store.
    pub fn in_memory() -> GraphResult<Self> {
        let store = Store::new().map_err(|e| GraphError::Sparql {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self { store })
    }

    /// Load every file into one store. A missing file means the provenance
    /// graph was never generated.
    pub fn from_files(paths: &[PathBuf]) -> GraphResult<Self> {
        let store = Self::in_memory()?;
        for path in paths {
            if !path.exists() {
                return Err(GraphError::ProvenanceGraphMissing {
                    path: path.display().to_string(),
                });
            }
            store.load_file(path)?;
        }
        Ok(store)
    }

    /// Load an RDF file, picking the syntax from its extension. `.json` is
    /// read as JSON-LD.
    pub fn load_file(&self, path: &Path) -> GraphResult<()> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| if e == "json" { "jsonld" } else { e })
            .unwrap_or_default();
        let format = RdfFormat::from_extension(ext).ok_or_else(|| GraphError::UnsupportedFormat {
            path: path.display().to_string(),
        })?;
        let file = std::fs::File::open(path).map_err(|e| GraphError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.store
            .load_from_reader(format, std::io::BufReader::new(file))
            .map_err(|e| GraphError::Load {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), "loaded provenance graph file");
        Ok(())
    }

    /// Load RDF text in the given syntax.
    pub fn load_str(&self, data: &str, syntax: RdfSyntax) -> GraphResult<()> {
        self.store
            .load_from_reader(syntax.format(), data.as_bytes())
            .map_err(|e| GraphError::Load {
                path: "<inline>".into(),
                message: e.to_string(),
            })
    }

    /// Number of quads in the store.
    pub fn len(&self) -> GraphResult<usize> {
        self.store.len().map_err(|e| GraphError::Sparql {
            message: format!("failed to count quads: {e}"),
        })
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> GraphResult<bool> {
        self.len().map(|n| n == 0)
    }
}

impl ProvenanceSource for SparqlStore {
    fn query(&self, sparql: &str) -> GraphResult<QueryOutcome> {
        let results = self.store.query(sparql).map_err(|e| GraphError::Sparql {
            message: format!("SPARQL query failed: {e}"),
        })?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| GraphError::Sparql {
                        message: format!("solution error: {e}"),
                    })?;
                    let mut row = Solution::new();
                    for (var, term) in solution.iter() {
                        if let Some(term) = term_from_ox(term.clone()) {
                            row.insert(var.as_str().to_string(), term);
                        }
                    }
                    rows.push(row);
                }
                Ok(QueryOutcome::Solutions(rows))
            }
            QueryResults::Graph(triples) => {
                let mut graph = MemoryGraph::new();
                for triple in triples {
                    let triple = triple.map_err(|e| GraphError::Sparql {
                        message: format!("construct error: {e}"),
                    })?;
                    if let Some(triple) = triple_from_ox(triple) {
                        graph.insert(triple);
                    }
                }
                Ok(QueryOutcome::Graph(graph))
            }
            QueryResults::Boolean(b) => Ok(QueryOutcome::Boolean(b)),
        }
    }

    fn serialize(&self, syntax: RdfSyntax) -> GraphResult<String> {
        let graph = self
            .query("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }")?
            .into_graph()?;
        serialize_graph(&graph, syntax)
    }
}

impl std::fmt::Debug for SparqlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlStore").finish()
    }
}

/// Write a graph in the given syntax, declaring its prefix bindings.
pub fn serialize_graph(graph: &MemoryGraph, syntax: RdfSyntax) -> GraphResult<String> {
    let mut serializer = RdfSerializer::from_format(syntax.format());
    if syntax != RdfSyntax::NTriples {
        for (prefix, namespace) in graph.namespaces().iter() {
            serializer = serializer
                .with_prefix(prefix, namespace)
                .map_err(|e| GraphError::InvalidTerm {
                    value: format!("{namespace}: {e}"),
                })?;
        }
    }
    let mut writer = serializer.for_writer(Vec::new());
    for triple in graph.iter() {
        let triple = triple_to_ox(triple)?;
        writer
            .serialize_triple(&triple)
            .map_err(|e| GraphError::Serialize {
                message: e.to_string(),
            })?;
    }
    let bytes = writer.finish().map_err(|e| GraphError::Serialize {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| GraphError::Serialize {
        message: e.to_string(),
    })
}

fn term_from_ox(term: OxTerm) -> Option<Term> {
    match term {
        OxTerm::NamedNode(node) => Some(Term::Iri(Iri::new(node.into_string()))),
        OxTerm::BlankNode(node) => Some(Term::Blank(node.into_string())),
        OxTerm::Literal(lit) => {
            let literal = match lit.language() {
                Some(lang) => Literal::lang_tagged(lit.value(), lang),
                None => Literal::typed(lit.value(), lit.datatype().as_str()),
            };
            Some(Term::Literal(literal))
        }
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn triple_from_ox(triple: OxTriple) -> Option<Triple> {
    let subject: OxTerm = triple.subject.into();
    Some(Triple {
        subject: term_from_ox(subject)?,
        predicate: Iri::new(triple.predicate.into_string()),
        object: term_from_ox(triple.object)?,
    })
}

fn named_node(iri: &str) -> GraphResult<NamedNode> {
    NamedNode::new(iri).map_err(|_| GraphError::InvalidTerm {
        value: iri.to_string(),
    })
}

fn blank_node(id: &str) -> GraphResult<BlankNode> {
    BlankNode::new(id).map_err(|_| GraphError::InvalidTerm {
        value: id.to_string(),
    })
}

fn term_to_ox(term: &Term) -> GraphResult<OxTerm> {
    Ok(match term {
        Term::Iri(iri) => named_node(iri.as_str())?.into(),
        Term::Blank(id) => blank_node(id)?.into(),
        Term::Literal(lit) => {
            let literal = if let Some(lang) = lit.language() {
                OxLiteral::new_language_tagged_literal(lit.value(), lang).map_err(|_| {
                    GraphError::InvalidTerm {
                        value: format!("@{lang}"),
                    }
                })?
            } else if let Some(datatype) = lit.datatype() {
                OxLiteral::new_typed_literal(lit.value(), named_node(datatype.as_str())?)
            } else {
                OxLiteral::new_simple_literal(lit.value())
            };
            literal.into()
        }
    })
}

fn triple_to_ox(triple: &Triple) -> GraphResult<OxTriple> {
    let predicate = named_node(triple.predicate.as_str())?;
    let object = term_to_ox(&triple.object)?;
    Ok(match &triple.subject {
        Term::Iri(iri) => OxTriple::new(named_node(iri.as_str())?, predicate, object),
        Term::Blank(id) => OxTriple::new(blank_node(id)?, predicate, object),
        Term::Literal(lit) => {
            return Err(GraphError::LiteralSubject {
                value: lit.value().to_string(),
            });
        }
    })
}
