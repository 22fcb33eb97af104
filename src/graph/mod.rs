//! RDF graph layer: term model, the `TripleStore` capability trait and its
//! implementations.
//!
//! - **Working graph** ([`MemoryGraph`]): ordered in-memory triple set the
//!   annotation passes mutate in place
//! - **Provenance source** ([`SparqlStore`]): uses `oxigraph` to load the
//!   provenance graph and answer SPARQL queries
//!
//! Passes only depend on [`TripleStore`], never on a concrete store.

pub mod memory;
pub mod namespace;
pub mod sparql;

use std::fmt;

pub use memory::MemoryGraph;
pub use namespace::{Namespaces, QName};
pub use sparql::{ProvenanceSource, QueryOutcome, RdfSyntax, Solution, SparqlStore};

use crate::vocab;

/// An absolute IRI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Iri {
    fn from(iri: &str) -> Self {
        Self::new(iri)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// An RDF literal. `xsd:string` literals are stored as plain literals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    lexical: String,
    datatype: Option<Iri>,
    language: Option<String>,
}

impl Literal {
    /// A plain string literal.
    pub fn simple(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    /// A typed literal.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        let datatype = datatype.into();
        Self {
            lexical: lexical.into(),
            datatype: (datatype.as_str() != vocab::XSD_STRING).then_some(datatype),
            language: None,
        }
    }

    /// A language-tagged string.
    pub fn lang_tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn value(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Integer interpretation of the lexical form, if it has one.
    pub fn as_i64(&self) -> Option<i64> {
        self.lexical.trim().parse().ok()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.lexical)?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")?;
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^{dt}")?;
        }
        Ok(())
    }
}

/// A node or value in a triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Iri(Iri),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(Iri::new(iri))
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Self::Blank(id.into())
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Self::Literal(Literal::simple(lexical))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// IRIs and blank nodes are resources; literals are values.
    pub fn is_resource(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }

    /// The IRI string, blank node id or literal lexical form.
    pub fn lexical(&self) -> &str {
        match self {
            Self::Iri(iri) => iri.as_str(),
            Self::Blank(id) => id,
            Self::Literal(lit) => lit.value(),
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Self::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => iri.fmt(f),
            Self::Blank(id) => write!(f, "_:{id}"),
            Self::Literal(lit) => lit.fmt(f),
        }
    }
}

/// A (subject, predicate, object) fact. Triples have set semantics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Capability contract the annotation passes, the cleaner and the renderer
/// depend on.
///
/// `triples_matching` returns an owned snapshot, so callers may insert and
/// remove while walking it; stores are not required to tolerate mutation
/// during their own iteration.
pub trait TripleStore {
    /// All triples matching the pattern; `None` is a wildcard.
    fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Triple>;

    /// Insert a triple. Returns `false` if it was already present.
    fn insert(&mut self, triple: Triple) -> bool;

    /// Remove a triple. Returns `false` if it was absent.
    fn remove(&mut self, triple: &Triple) -> bool;

    /// Number of triples.
    fn len(&self) -> usize;

    /// Prefix bindings used for qualified names.
    fn namespaces(&self) -> &Namespaces;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every triple matching the pattern, returning how many went.
    fn remove_matching(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> usize {
        let matched = self.triples_matching(subject, predicate, object);
        for triple in &matched {
            self.remove(triple);
        }
        matched.len()
    }

    /// Objects of `(subject, predicate, ?)`.
    fn objects(&self, subject: &Term, predicate: &Iri) -> Vec<Term> {
        self.triples_matching(Some(subject), Some(predicate), None)
            .into_iter()
            .map(|t| t.object)
            .collect()
    }

    /// Subjects of `(?, predicate, object)`.
    fn subjects(&self, predicate: &Iri, object: &Term) -> Vec<Term> {
        self.triples_matching(None, Some(predicate), Some(object))
            .into_iter()
            .map(|t| t.subject)
            .collect()
    }

    /// `(subject, object)` pairs of every triple with `predicate`.
    fn subject_objects(&self, predicate: &Iri) -> Vec<(Term, Term)> {
        self.triples_matching(None, Some(predicate), None)
            .into_iter()
            .map(|t| (t.subject, t.object))
            .collect()
    }

    /// First object of `(subject, predicate, ?)`.
    fn value(&self, subject: &Term, predicate: &Iri) -> Option<Term> {
        self.objects(subject, predicate).into_iter().next()
    }

    /// Human label for a node: a label predicate if one is set, else the
    /// local part of its qualified name, else the raw identifier.
    fn label(&self, node: &Term) -> String {
        for prop in vocab::LABEL_PROPERTIES {
            if let Some(value) = self.value(node, &Iri::new(prop)) {
                if !value.lexical().is_empty() {
                    return value.lexical().to_string();
                }
            }
        }
        match node {
            Term::Iri(iri) => match self.namespaces().compute_qname(iri.as_str()) {
                Some(qname) => qname.local,
                None => iri.as_str().to_string(),
            },
            other => other.lexical().to_string(),
        }
    }
}
