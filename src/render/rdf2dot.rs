//! RDF graph → [`DotGraph`], one table-labelled node per resource.

use std::collections::{BTreeMap, BTreeSet};

use quick_xml::escape::escape;

use super::dot::{DotEdge, DotGraph, DotNode};
use crate::graph::namespace::QNameResolver;
use crate::graph::{Literal, Term, TripleStore};
use crate::vocab;

const FONT_NAME: &str = "DejaVu Sans";

fn format_literal(lit: &Literal, qnames: &mut QNameResolver<'_>) -> String {
    let value = escape(lit.value());
    if let Some(datatype) = lit.datatype() {
        format!("&quot;{value}&quot;^^{}", qnames.qname(datatype.as_str()))
    } else if let Some(lang) = lit.language() {
        format!("&quot;{value}&quot;@{lang}")
    } else {
        format!("&quot;{value}&quot;")
    }
}

fn node_label(title: &str, id: &str, rows: &BTreeSet<(String, String)>) -> String {
    let id = escape(id);
    let mut label = format!(
        "<table color='#666666' cellborder='0' cellspacing='0' border='1'>\
         <tr><td colspan='2' bgcolor='grey'><B>{}</B></td></tr>\
         <tr><td href='{id}' bgcolor='#eeeeee' colspan='2'>\
         <font point-size='10' color='#6666ff'>{id}</font></td></tr>",
        escape(title)
    );
    for (qname, value) in rows {
        label.push_str(&format!(
            "<tr><td align='left'>{qname}</td><td align='left'>{value}</td></tr>"
        ));
    }
    label.push_str("</table>");
    label
}

/// Convert a graph into a diagram. Resource-valued triples become edges
/// labelled with the predicate's qualified name; literal-valued triples become
/// rows of the subject's table, sorted by (qualified name, value).
/// `rdfs:label` triples are not drawn.
pub fn rdf_to_dot(graph: &dyn TripleStore) -> DotGraph {
    let mut qnames = QNameResolver::new(graph.namespaces());
    let mut dot = DotGraph::new();
    dot.node_defaults
        .insert("fontname".to_string(), FONT_NAME.to_string());

    let mut ids: BTreeMap<Term, String> = BTreeMap::new();
    let mut order: Vec<Term> = Vec::new();
    let mut fields: BTreeMap<String, BTreeSet<(String, String)>> = BTreeMap::new();
    let mut edges: Vec<(String, String, String)> = Vec::new();

    let mut node_id = |term: &Term, ids: &mut BTreeMap<Term, String>| -> String {
        if let Some(id) = ids.get(term) {
            return id.clone();
        }
        let id = format!("node{}", ids.len());
        ids.insert(term.clone(), id.clone());
        order.push(term.clone());
        id
    };

    for triple in graph.triples_matching(None, None, None) {
        let subject = node_id(&triple.subject, &mut ids);
        if triple.predicate.as_str() == vocab::RDFS_LABEL {
            continue;
        }
        let predicate = qnames.qname(triple.predicate.as_str());
        match &triple.object {
            Term::Literal(lit) => {
                let value = format_literal(lit, &mut qnames);
                fields.entry(subject).or_default().insert((predicate, value));
            }
            object => {
                let target = node_id(object, &mut ids);
                edges.push((subject, target, predicate));
            }
        }
    }

    let empty = BTreeSet::new();
    for term in order {
        let id = ids[&term].clone();
        let mut node = DotNode::new(id.clone());
        node.set_attr("shape", "none");
        node.set_attr("color", "black");
        node.label = Some(node_label(
            &graph.label(&term),
            term.lexical(),
            fields.get(&id).unwrap_or(&empty),
        ));
        node.term = Some(term);
        dot.ensure_node(node);
    }

    for (from, to, predicate) in edges {
        let (Some(from), Some(to)) = (dot.index_of(&from), dot.index_of(&to)) else {
            continue;
        };
        let mut edge = DotEdge::default();
        edge.set_attr("color", "BLACK");
        edge.label = Some(format!(
            "<font point-size='10' color='#336633'>{predicate}</font>"
        ));
        dot.add_edge(from, to, edge);
    }

    tracing::debug!(
        nodes = dot.node_count(),
        edges = dot.edge_count(),
        "render: graph converted to dot"
    );
    dot
}
