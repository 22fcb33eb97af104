//! Ordered in-memory triple store.
//!
//! Backed by a `BTreeSet`, so iteration order (and everything derived from it,
//! such as dot node numbering) is deterministic across runs.

use std::collections::BTreeSet;

use super::{Iri, Namespaces, Term, Triple, TripleStore};

/// In-memory working graph the annotation pipeline mutates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryGraph {
    triples: BTreeSet<Triple>,
    namespaces: Namespaces,
}

impl MemoryGraph {
    /// Empty graph with the default prefix bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from triples; duplicates collapse.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut graph = Self::new();
        graph.extend(triples);
        graph
    }

    /// Bind an extra prefix.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.namespaces.bind(prefix, namespace);
    }

    pub fn namespaces_mut(&mut self) -> &mut Namespaces {
        &mut self.namespaces
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }
}

impl Extend<Triple> for MemoryGraph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl TripleStore for MemoryGraph {
    fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        self.triples
            .iter()
            .filter(|t| subject.is_none_or(|s| &t.subject == s))
            .filter(|t| predicate.is_none_or(|p| &t.predicate == p))
            .filter(|t| object.is_none_or(|o| &t.object == o))
            .cloned()
            .collect()
    }

    fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    fn len(&self) -> usize {
        self.triples.len()
    }

    fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }
}
