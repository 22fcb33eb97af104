use super::{AnnotationContext, Footprint, Stage, StageKind};
use crate::error::AnnotateResult;
use crate::graph::{Iri, Triple, TripleStore};
use crate::vocab;

/// Moves `prov:startedAtTime` from each activity onto the plan it executed,
/// following `prov:qualifiedAssociation / prov:hadPlan`. Every association
/// and plan found is processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityTimeRelocation;

impl Stage for ActivityTimeRelocation {
    fn kind(&self) -> StageKind {
        StageKind::ActivityTime
    }

    fn footprint(&self) -> Footprint {
        Footprint {
            reads: &[
                vocab::PROV_STARTED_AT_TIME,
                vocab::PROV_QUALIFIED_ASSOCIATION,
                vocab::PROV_HAD_PLAN,
            ],
            deletes: &[vocab::PROV_STARTED_AT_TIME],
        }
    }

    fn run(&self, graph: &mut dyn TripleStore, _ctx: &mut AnnotationContext) -> AnnotateResult<()> {
        let started = Iri::new(vocab::PROV_STARTED_AT_TIME);
        let association = Iri::new(vocab::PROV_QUALIFIED_ASSOCIATION);
        let had_plan = Iri::new(vocab::PROV_HAD_PLAN);
        for (activity, time) in graph.subject_objects(&started) {
            for assoc in graph.objects(&activity, &association) {
                for plan in graph.objects(&assoc, &had_plan) {
                    tracing::debug!(%activity, %plan, "activity-time: relocated");
                    graph.insert(Triple::new(plan, started.clone(), time.clone()));
                    graph.remove(&Triple::new(activity.clone(), started.clone(), time.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Literal, MemoryGraph, Term};

    #[test]
    fn time_moves_to_plan() {
        let activity = Term::iri("https://e.org/activities/a1");
        let assoc = Term::iri("https://e.org/activities/a1/association");
        let plan = Term::iri("https://e.org/plans/p1");
        let time: Term = Literal::typed("2021-01-01T00:00:00", vocab::XSD_DATE_TIME).into();
        let mut graph = MemoryGraph::from_triples([
            Triple::new(activity.clone(), vocab::PROV_STARTED_AT_TIME, time.clone()),
            Triple::new(activity.clone(), vocab::PROV_QUALIFIED_ASSOCIATION, assoc.clone()),
            Triple::new(assoc, vocab::PROV_HAD_PLAN, plan.clone()),
        ]);
        ActivityTimeRelocation
            .run(&mut graph, &mut AnnotationContext::default())
            .unwrap();
        let started = Iri::new(vocab::PROV_STARTED_AT_TIME);
        assert_eq!(graph.objects(&plan, &started), vec![time]);
        assert!(graph.objects(&activity, &started).is_empty());
    }

    #[test]
    fn activity_without_plan_keeps_its_time() {
        let activity = Term::iri("https://e.org/activities/a1");
        let mut graph = MemoryGraph::from_triples([Triple::new(
            activity.clone(),
            vocab::PROV_STARTED_AT_TIME,
            Term::literal("2021-01-01T00:00:00"),
        )]);
        ActivityTimeRelocation
            .run(&mut graph, &mut AnnotationContext::default())
            .unwrap();
        assert_eq!(graph.len(), 1);
    }
}
