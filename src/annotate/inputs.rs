use super::{AnnotationContext, Footprint, Stage, StageKind};
use crate::error::AnnotateResult;
use crate::graph::{Iri, Triple, TripleStore};
use crate::vocab;

/// Collects input values and links every input back to its action with
/// `renku:isInputOf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputAnalysis;

impl Stage for InputAnalysis {
    fn kind(&self) -> StageKind {
        StageKind::Inputs
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            reads: &[vocab::RENKU_HAS_INPUTS, vocab::SCHEMA_DEFAULT_VALUE],
            deletes: &[],
        }
    }

    fn run(&self, graph: &mut dyn TripleStore, ctx: &mut AnnotationContext) -> AnnotateResult<()> {
        let default_value = Iri::new(vocab::SCHEMA_DEFAULT_VALUE);
        for (action, input) in graph.subject_objects(&Iri::new(vocab::RENKU_HAS_INPUTS)) {
            let values = ctx.input_values.entry(graph.label(&action)).or_default();
            values.extend(
                graph
                    .objects(&input, &default_value)
                    .iter()
                    .map(|v| v.lexical().to_string()),
            );
            graph.insert(Triple::new(input, vocab::RENKU_IS_INPUT_OF, action));
        }
        Ok(())
    }
}
