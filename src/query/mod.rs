//! Structured SPARQL fragment builder.
//!
//! Queries are assembled from typed blocks (subject blocks, groups, optionals,
//! unions, filters) and rendered to text at the end, so each clause can be
//! built and tested on its own and literal values are always escaped.

pub mod provenance;
pub mod requests;

use std::fmt::{self, Write as _};

pub use provenance::{ProvenanceQuery, build_query, build_query_construct, build_query_where};

/// A term position in a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTerm {
    Var(String),
    Iri(String),
    Literal(String),
}

impl QueryTerm {
    pub fn var(name: &str) -> Self {
        Self::Var(name.to_string())
    }

    pub fn iri(iri: &str) -> Self {
        Self::Iri(iri.to_string())
    }

    pub fn literal(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "?{name}"),
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Literal(value) => write!(f, "\"{}\"", escape_literal(value)),
        }
    }
}

/// Escape a string for use inside a double-quoted SPARQL literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// A property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyPath {
    Iri(String),
    Inverse(Box<PropertyPath>),
    Sequence(Vec<PropertyPath>),
}

impl PropertyPath {
    /// `^first/second`: walk `first` backwards, then `second` forwards.
    pub fn inverse_then(first: &str, second: &str) -> Self {
        Self::Sequence(vec![
            Self::Inverse(Box::new(Self::Iri(first.to_string()))),
            Self::Iri(second.to_string()),
        ])
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Inverse(inner) => write!(f, "^{inner}"),
            Self::Sequence(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        f.write_char('/')?;
                    }
                    write!(f, "{step}")?;
                }
                Ok(())
            }
        }
    }
}

/// The predicate position of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// `a` (rdf:type)
    A,
    Iri(String),
    Var(String),
    Path(PropertyPath),
}

impl From<&str> for Verb {
    fn from(iri: &str) -> Self {
        Self::Iri(iri.to_string())
    }
}

impl From<PropertyPath> for Verb {
    fn from(path: PropertyPath) -> Self {
        Self::Path(path)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("a"),
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Var(name) => write!(f, "?{name}"),
            Self::Path(path) => path.fmt(f),
        }
    }
}

/// A subject with its predicate/object list: `?s p1 o1 ; p2 o2 .`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectBlock {
    subject: QueryTerm,
    properties: Vec<(Verb, QueryTerm)>,
}

impl SubjectBlock {
    pub fn new(subject: QueryTerm) -> Self {
        Self {
            subject,
            properties: Vec::new(),
        }
    }

    pub fn with(mut self, verb: impl Into<Verb>, object: QueryTerm) -> Self {
        self.properties.push((verb.into(), object));
        self
    }

    /// Add an `a ?type` pattern.
    pub fn typed(self, object: QueryTerm) -> Self {
        self.with(Verb::A, object)
    }

    fn render(&self, out: &mut String, depth: usize) {
        let pad = indent(depth);
        let _ = write!(out, "{pad}{}", self.subject);
        for (i, (verb, object)) in self.properties.iter().enumerate() {
            if i == 0 {
                let _ = write!(out, " {verb} {object}");
            } else {
                let _ = write!(out, " ;\n{pad}    {verb} {object}");
            }
        }
        out.push_str(" .\n");
    }
}

/// Filter expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Equals(QueryTerm, QueryTerm),
    In(QueryTerm, Vec<QueryTerm>),
    /// `!CONTAINS(str(term), needle)`
    NotContains(QueryTerm, String),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(lhs, rhs) => write!(f, "{lhs} = {rhs}"),
            Self::In(term, options) => {
                write!(f, "{term} IN (")?;
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{option}")?;
                }
                f.write_char(')')
            }
            Self::NotContains(term, needle) => {
                write!(f, "!CONTAINS(str({term}), \"{}\")", escape_literal(needle))
            }
        }
    }
}

/// Graph patterns inside a WHERE clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupPattern {
    Block(SubjectBlock),
    Group(Vec<GroupPattern>),
    Optional(Vec<GroupPattern>),
    Union(Vec<Vec<GroupPattern>>),
    Filter(Expr),
}

impl GroupPattern {
    fn render(&self, out: &mut String, depth: usize) {
        let pad = indent(depth);
        match self {
            Self::Block(block) => block.render(out, depth),
            Self::Group(patterns) => {
                let _ = writeln!(out, "{pad}{{");
                render_all(patterns, out, depth + 1);
                let _ = writeln!(out, "{pad}}}");
            }
            Self::Optional(patterns) => {
                let _ = writeln!(out, "{pad}OPTIONAL {{");
                render_all(patterns, out, depth + 1);
                let _ = writeln!(out, "{pad}}}");
            }
            Self::Union(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        let _ = writeln!(out, "{pad}UNION");
                    }
                    let _ = writeln!(out, "{pad}{{");
                    render_all(branch, out, depth + 1);
                    let _ = writeln!(out, "{pad}}}");
                }
            }
            Self::Filter(expr) => {
                let _ = writeln!(out, "{pad}FILTER ({expr})");
            }
        }
    }
}

impl From<SubjectBlock> for GroupPattern {
    fn from(block: SubjectBlock) -> Self {
        Self::Block(block)
    }
}

fn render_all(patterns: &[GroupPattern], out: &mut String, depth: usize) {
    for pattern in patterns {
        pattern.render(out, depth);
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `WHERE { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WhereClause {
    patterns: Vec<GroupPattern>,
}

impl WhereClause {
    pub fn new(patterns: Vec<GroupPattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[GroupPattern] {
        &self.patterns
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::from("WHERE {\n");
        render_all(&self.patterns, &mut out, 1);
        out.push('}');
        f.write_str(&out)
    }
}

/// `CONSTRUCT { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstructTemplate {
    blocks: Vec<SubjectBlock>,
}

impl ConstructTemplate {
    pub fn new(blocks: Vec<SubjectBlock>) -> Self {
        Self { blocks }
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = SubjectBlock>) {
        self.blocks.extend(blocks);
    }

    pub fn blocks(&self) -> &[SubjectBlock] {
        &self.blocks
    }
}

impl fmt::Display for ConstructTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::from("CONSTRUCT {\n");
        for block in &self.blocks {
            block.render(&mut out, 1);
        }
        out.push('}');
        f.write_str(&out)
    }
}

/// `SELECT [DISTINCT] ?a ?b WHERE { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub distinct: bool,
    pub variables: Vec<String>,
    pub where_clause: WhereClause,
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        for var in &self.variables {
            write!(f, "?{var} ")?;
        }
        write!(f, "\n{}", self.where_clause)
    }
}
