//! Fixed queries over astroquery requests, used by the `leaderboard` and
//! `params` commands.

use super::{
    ConstructTemplate, Expr, GroupPattern, PropertyPath, QueryTerm, SelectQuery, SubjectBlock,
    Verb, WhereClause,
};
use crate::vocab;

fn var(name: &str) -> QueryTerm {
    QueryTerm::var(name)
}

/// `(object, module)` pairs of every run requesting an astrophysical object.
pub fn leaderboard_query() -> SelectQuery {
    SelectQuery {
        distinct: true,
        variables: vec!["run".into(), "a_object".into(), "aq_module".into()],
        where_clause: WhereClause::new(vec![
            SubjectBlock::new(var("run"))
                .with(vocab::ODA_IS_REQUESTING_ASTRO_OBJECT, var("a_object"))
                .with(vocab::ODA_IS_USING, var("aq_module"))
                .into(),
        ]),
    }
}

fn request_patterns() -> Vec<GroupPattern> {
    vec![
        SubjectBlock::new(var("run"))
            .with(vocab::ODA_IS_REQUESTING_ASTRO_OBJECT, var("a_object"))
            .with(vocab::ODA_IS_USING, var("aq_module"))
            .with(
                PropertyPath::inverse_then(vocab::OA_HAS_BODY, vocab::OA_HAS_TARGET),
                var("runId"),
            )
            .into(),
        SubjectBlock::new(var("a_object"))
            .with(vocab::DCTERMS_TITLE, var("a_object_name"))
            .into(),
        SubjectBlock::new(var("aq_module"))
            .with(vocab::DCTERMS_TITLE, var("aq_module_name"))
            .into(),
        SubjectBlock::new(var("run"))
            .with(Verb::Var("p".into()), var("o"))
            .into(),
    ]
}

/// Run id, module and object of every object request. Rows whose object IRI
/// contains a space are invalid and filtered by the caller.
pub fn params_select() -> SelectQuery {
    SelectQuery {
        distinct: true,
        variables: [
            "run",
            "runId",
            "a_object",
            "a_object_name",
            "aq_module",
            "aq_module_name",
        ]
        .map(String::from)
        .to_vec(),
        where_clause: WhereClause::new(request_patterns()),
    }
}

/// The subgraph of every valid object request, with all of the run's triples.
pub fn params_construct() -> String {
    let template = ConstructTemplate::new(vec![
        SubjectBlock::new(var("run"))
            .with(vocab::ODA_IS_REQUESTING_ASTRO_OBJECT, var("a_object"))
            .with(vocab::ODA_IS_USING, var("aq_module"))
            .with(Verb::Var("p".into()), var("o")),
    ]);
    let mut patterns = request_patterns();
    patterns.push(GroupPattern::Filter(Expr::NotContains(var("a_object"), " ".into())));
    format!("{template}\n{}", WhereClause::new(patterns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_is_distinct() {
        let text = leaderboard_query().to_string();
        assert!(text.starts_with("SELECT DISTINCT ?run ?a_object ?aq_module"));
        assert!(text.contains(vocab::ODA_IS_USING));
    }

    #[test]
    fn params_construct_filters_invalid_objects() {
        let text = params_construct();
        assert!(text.starts_with("CONSTRUCT {"));
        assert!(text.contains("FILTER (!CONTAINS(str(?a_object), \" \"))"));
        assert!(!params_select().to_string().contains("FILTER"));
    }
}
