//! Removal of provenance plumbing once annotation has folded it into the graph.

use crate::graph::{Iri, TripleStore};
use crate::vocab;

/// Predicates whose triples are dropped, whatever their subject.
pub const TRANSIENT_PREDICATES: [&str; 8] = [
    vocab::PROV_HAD_PLAN,
    vocab::DCTERMS_TITLE,
    vocab::PROV_QUALIFIED_ASSOCIATION,
    vocab::OA_HAS_TARGET,
    vocab::RENKU_POSITION,
    vocab::RENKU_HAS_ARGUMENTS,
    vocab::RENKU_HAS_INPUTS,
    vocab::RDF_TYPE,
];

/// Strip transient triples. Returns how many were removed; a second call
/// removes nothing.
pub fn clean_graph(graph: &mut dyn TripleStore) -> usize {
    let removed: usize = TRANSIENT_PREDICATES
        .iter()
        .map(|p| graph.remove_matching(None, Some(&Iri::new(*p)), None))
        .sum();
    tracing::info!(removed, remaining = graph.len(), "clean: transient triples removed");
    removed
}
