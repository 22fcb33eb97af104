use super::{AnnotationContext, Footprint, Stage, StageKind, type_name};
use crate::error::AnnotateResult;
use crate::graph::{Iri, Term, TripleStore};
use crate::vocab;

/// Records `label(subject) → local-name(type)` for every typed subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeAnalysis;

impl Stage for TypeAnalysis {
    fn kind(&self) -> StageKind {
        StageKind::Types
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            reads: &[vocab::RDF_TYPE],
            deletes: &[],
        }
    }

    fn run(&self, graph: &mut dyn TripleStore, ctx: &mut AnnotationContext) -> AnnotateResult<()> {
        for (subject, object) in graph.subject_objects(&Iri::new(vocab::RDF_TYPE)) {
            let Term::Iri(ty) = &object else {
                continue;
            };
            let label = graph.label(&subject);
            let name = type_name(graph, ty.as_str());
            tracing::debug!(%label, %name, "types: recorded");
            ctx.type_map.insert(label, name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, Triple};

    #[test]
    fn maps_labels_to_local_type_names() {
        let mut graph = MemoryGraph::from_triples([
            Triple::new(
                Term::iri("https://e.org/plans/p1"),
                vocab::RDF_TYPE,
                Term::iri(vocab::SCHEMA_ACTION),
            ),
            Triple::new(
                Term::iri("https://e.org/plans/p1/inputs/1"),
                vocab::RDF_TYPE,
                Term::iri(vocab::RENKU_COMMAND_INPUT),
            ),
            Triple::new(
                Term::iri("https://e.org/mod"),
                vocab::RDF_TYPE,
                Term::iri("http://odahub.io/ontology#AstroqueryModule"),
            ),
            Triple::new(
                Term::iri("https://e.org/mod"),
                vocab::RDFS_LABEL,
                Term::literal("Simbad"),
            ),
        ]);
        let mut ctx = AnnotationContext::default();
        TypeAnalysis.run(&mut graph, &mut ctx).unwrap();
        assert_eq!(ctx.type_map["p1"], "Action");
        assert_eq!(ctx.type_map["1"], "CommandInput");
        assert_eq!(ctx.type_map["Simbad"], "AstroqueryModule");
        assert_eq!(graph.len(), 4);
    }
}
