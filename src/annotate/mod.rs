//! Annotation pipeline: ordered rewrite stages over the working graph.
//!
//! Each stage reads some predicates and deletes some of the triples it read,
//! so later stages depend on what earlier ones left behind. The order is fixed
//! by [`StageKind::rank`] and enforced when the pipeline is assembled; running
//! consumes the pipeline, so no stage can execute twice on the same graph.

pub mod activity;
pub mod arguments;
pub mod inputs;
pub mod oda;
pub mod outputs;
pub mod types;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{AnnotateError, AnnotateResult};
use crate::graph::{Term, TripleStore};

pub use activity::ActivityTimeRelocation;
pub use arguments::ArgumentAnalysis;
pub use inputs::InputAnalysis;
pub use oda::OdaInference;
pub use outputs::OutputAnalysis;
pub use types::TypeAnalysis;

/// Node label → semantic type name (local part of its `rdf:type`).
pub type TypeMap = BTreeMap<String, String>;

/// The annotation stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageKind {
    Types,
    Outputs,
    Arguments,
    Inputs,
    ActivityTime,
    Oda,
}

impl StageKind {
    /// Position in the fixed execution order.
    pub fn rank(self) -> u8 {
        match self {
            Self::Types => 0,
            Self::Outputs => 1,
            Self::Arguments => 2,
            Self::Inputs => 3,
            Self::ActivityTime => 4,
            Self::Oda => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Types => "types",
            Self::Outputs => "outputs",
            Self::Arguments => "arguments",
            Self::Inputs => "inputs",
            Self::ActivityTime => "activity-time",
            Self::Oda => "oda",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Predicates a stage reads, and those whose triples it deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub reads: &'static [&'static str],
    pub deletes: &'static [&'static str],
}

/// State shared across stages of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationContext {
    /// Kept current by the stages that retype or mint nodes.
    pub type_map: TypeMap,
    /// Action label → default values of its outputs.
    pub output_values: BTreeMap<String, Vec<Term>>,
    /// Action label → default values of its inputs.
    pub input_values: BTreeMap<String, Vec<String>>,
    /// Action label → `(value, position)` of its positional arguments.
    pub argument_values: BTreeMap<String, Vec<(String, i64)>>,
}

/// A rewrite pass over the working graph.
pub trait Stage {
    fn kind(&self) -> StageKind;

    fn footprint(&self) -> Footprint;

    fn run(&self, graph: &mut dyn TripleStore, ctx: &mut AnnotationContext)
    -> AnnotateResult<()>;
}

/// Stages in rank order.
#[derive(Default)]
pub struct AnnotationPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl fmt::Debug for AnnotationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.kind()))
            .finish()
    }
}

impl AnnotationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// All six stages.
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Box::new(TypeAnalysis),
                Box::new(OutputAnalysis),
                Box::new(ArgumentAnalysis),
                Box::new(InputAnalysis),
                Box::new(ActivityTimeRelocation),
                Box::new(OdaInference),
            ],
        }
    }

    /// Append a stage. Fails if its rank is not above every stage already added.
    pub fn push(mut self, stage: impl Stage + 'static) -> AnnotateResult<Self> {
        if let Some(last) = self.stages.last() {
            if stage.kind().rank() <= last.kind().rank() {
                return Err(AnnotateError::StageOrder {
                    stage: stage.kind().to_string(),
                    previous: last.kind().to_string(),
                });
            }
        }
        self.stages.push(Box::new(stage));
        Ok(self)
    }

    pub fn kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Run every stage once, in order, returning the accumulated context.
    pub fn run(self, graph: &mut dyn TripleStore) -> AnnotateResult<AnnotationContext> {
        let mut ctx = AnnotationContext::default();
        for stage in &self.stages {
            let before = graph.len();
            stage.run(graph, &mut ctx)?;
            tracing::info!(
                stage = %stage.kind(),
                before,
                after = graph.len(),
                "annotate: stage complete"
            );
        }
        Ok(ctx)
    }
}

/// Local part of a type IRI, or the IRI itself when it cannot be split.
pub(crate) fn type_name(graph: &dyn TripleStore, iri: &str) -> String {
    graph
        .namespaces()
        .compute_qname(iri)
        .map_or_else(|| iri.to_string(), |q| q.local)
}

/// The only element of `values`. Zero or several matches skip enrichment.
pub(crate) fn single(values: Vec<Term>, what: &str, node: &Term) -> Option<Term> {
    match <[Term; 1]>::try_from(values) {
        Ok([value]) => Some(value),
        Err(values) => {
            tracing::debug!(%node, what, count = values.len(), "annotate: expected one value, skipping");
            None
        }
    }
}
