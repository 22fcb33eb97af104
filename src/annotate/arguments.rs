use std::collections::BTreeMap;

use super::{AnnotationContext, Footprint, Stage, StageKind, single, type_name};
use crate::error::{AnnotateError, AnnotateResult};
use crate::graph::{Iri, Term, Triple, TripleStore};
use crate::vocab;

/// Joins positional arguments into `CommandParameter` nodes.
///
/// Values are sorted by position and consumed two at a time, each pair
/// becoming one node whose default value is `"<first> <second>"`. A trailing
/// unpaired value produces nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentAnalysis;

/// IRI of the parameter node minted for `(first, second)` under `action`.
pub fn parameter_node(action: &Term, first: &str, second: &str) -> Term {
    let base = match action {
        Term::Iri(iri) => format!("{}/parameters/", iri.as_str()),
        _ => vocab::PARAMETER_BASE.to_string(),
    };
    Term::iri(format!(
        "{base}{}_{}",
        urlencoding::encode(first),
        urlencoding::encode(second)
    ))
}

fn position_of(argument: &Term, position: &Term) -> AnnotateResult<i64> {
    position
        .as_literal()
        .and_then(|lit| lit.as_i64())
        .ok_or_else(|| AnnotateError::MalformedLiteral {
            what: "position".into(),
            node: argument.to_string(),
            value: position.lexical().to_string(),
        })
}

impl Stage for ArgumentAnalysis {
    fn kind(&self) -> StageKind {
        StageKind::Arguments
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            reads: &[
                vocab::RENKU_HAS_ARGUMENTS,
                vocab::SCHEMA_DEFAULT_VALUE,
                vocab::RENKU_POSITION,
            ],
            deletes: &[vocab::SCHEMA_DEFAULT_VALUE],
        }
    }

    fn run(&self, graph: &mut dyn TripleStore, ctx: &mut AnnotationContext) -> AnnotateResult<()> {
        let default_value = Iri::new(vocab::SCHEMA_DEFAULT_VALUE);
        let position = Iri::new(vocab::RENKU_POSITION);
        let mut owners: BTreeMap<String, Term> = BTreeMap::new();

        for (action, argument) in graph.subject_objects(&Iri::new(vocab::RENKU_HAS_ARGUMENTS)) {
            let label = graph.label(&action);
            owners.entry(label.clone()).or_insert(action);
            let values = ctx.argument_values.entry(label).or_default();
            for value in graph.objects(&argument, &default_value) {
                let Some(pos) = single(graph.objects(&argument, &position), "position", &argument)
                else {
                    continue;
                };
                values.push((value.lexical().to_string(), position_of(&argument, &pos)?));
                graph.remove(&Triple::new(argument.clone(), default_value.clone(), value));
            }
        }

        let mut minted = Vec::new();
        for (label, values) in &ctx.argument_values {
            let Some(action) = owners.get(label) else {
                continue;
            };
            let mut sorted = values.clone();
            sorted.sort_by_key(|(_, pos)| *pos);
            for pair in sorted.chunks_exact(2) {
                let (first, second) = (&pair[0].0, &pair[1].0);
                let node = parameter_node(action, first, second);
                let value = format!("{first} {second}").trim().to_string();
                minted.push((node, action.clone(), value));
            }
            if sorted.len() % 2 == 1 {
                tracing::debug!(%label, "arguments: dropping unpaired trailing value");
            }
        }

        let parameter_type = type_name(graph, vocab::RENKU_COMMAND_PARAMETER);
        for (node, action, value) in minted {
            graph.insert(Triple::new(node.clone(), vocab::RENKU_IS_ARGUMENT_OF, action));
            graph.insert(Triple::new(
                node.clone(),
                vocab::SCHEMA_DEFAULT_VALUE,
                Term::literal(value),
            ));
            graph.insert(Triple::new(
                node.clone(),
                vocab::RDF_TYPE,
                Term::iri(vocab::RENKU_COMMAND_PARAMETER),
            ));
            ctx.type_map
                .insert(graph.label(&node), parameter_type.clone());
        }
        Ok(())
    }
}
