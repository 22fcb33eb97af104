// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # renku-aqs
//!
//! Astroquery-aware post-processing of a Renku provenance graph: extracts the
//! subgraph of one workflow, enriches it with astronomical request relations,
//! strips provenance plumbing and renders a styled diagram.
//!
//! ## Architecture
//!
//! - **Graph layer** (`graph`): term model, the `TripleStore` trait, an ordered
//!   in-memory store and an oxigraph-backed SPARQL store
//! - **Query builder** (`query`): structured CONSTRUCT/SELECT fragments
//! - **Annotation** (`annotate`): ordered rewrite stages with declared footprints
//! - **Cleaner** (`clean`): removal of transient triples
//! - **Renderer** (`render`): rdf → dot conversion and type-driven restyling
//!
//! ## Library usage
//!
//! ```no_run
//! use renku_aqs::commands::{DisplayOptions, display, write_subgraph};
//! use renku_aqs::config::AqsConfig;
//! use renku_aqs::graph::SparqlStore;
//!
//! let config = AqsConfig::default();
//! let store = SparqlStore::from_files(&[config.provenance_graph.clone()]).unwrap();
//! let outcome = display(&store, &config.namespaces(), &DisplayOptions::default()).unwrap();
//! write_subgraph(&outcome.graph, &config.subgraph_path()).unwrap();
//! outcome
//!     .diagram
//!     .write_image(&config.image_path(None), &config.graphviz_binary)
//!     .unwrap();
//! ```

pub mod annotate;
pub mod annotations;
pub mod astro;
pub mod clean;
pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod query;
pub mod render;
pub mod vocab;
