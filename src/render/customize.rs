//! Restyling of the diagram produced by [`rdf_to_dot`](super::rdf_to_dot).
//!
//! Nodes are matched against the type map by their title text. A matched
//! node gets the style of its type, loses its identifier row (and its title
//! row for some types), and has each remaining `field | value` row collapsed
//! into a single centred value cell. A `startedAtTime` row is reformatted and
//! moved to the bottom of the table.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::dot::{DotEdge, DotGraph, DotNode};
use super::label::{Element, LabelTree, Node};
use super::style::StyleTable;
use crate::annotate::TypeMap;
use crate::error::{RenderError, RenderResult};

const PARAMETER_TYPE: &str = "CommandParameter";
const OUTPUT_PREFIX: &str = "CommandOutput";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Drop the first and last character, if any.
fn strip_first_last(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

fn parse_timestamp(value: &str) -> RenderResult<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| RenderError::Timestamp {
            value: value.to_string(),
        })
}

/// Keep only the predicate's local name in an edge label.
pub fn customize_edge(edge: &mut DotEdge) -> RenderResult<()> {
    let Some(markup) = edge.label.as_deref() else {
        return Ok(());
    };
    let mut tree = LabelTree::parse(markup)?;
    let root = tree.root_mut();
    if let Some((_, local)) = root.text().and_then(|text| text.split_once(':')) {
        let local = local.to_string();
        root.set_text(local);
    }
    edge.label = Some(tree.to_string());
    Ok(())
}

fn title_of(table: &Element) -> Option<String> {
    table
        .elements("tr")
        .next()?
        .elements("td")
        .next()?
        .elements("B")
        .next()?
        .text()
        .map(str::to_string)
}

fn title_mut(row: &mut Element) -> Option<&mut Element> {
    row.element_mut("td")?.element_mut("B")
}

/// What became of one value row.
enum RowOutcome {
    Keep(Element),
    /// Moved to the end of the table.
    Bottom(Element),
}

struct RowContext<'a> {
    type_name: &'a str,
    title_row: Option<&'a mut Element>,
}

fn customize_row(mut row: Element, ctx: &mut RowContext<'_>) -> RenderResult<RowOutcome> {
    if row.elements("td").count() != 2 {
        return Ok(RowOutcome::Keep(row));
    }
    let fields: Vec<String> = row
        .elements("td")
        .next()
        .and_then(Element::text)
        .unwrap_or_default()
        .split(':')
        .map(str::to_string)
        .collect();
    let has_field = |name: &str| fields.iter().any(|f| f == name);

    if let Some(index) = row
        .children()
        .iter()
        .position(|c| matches!(c, Node::Element(e) if e.name() == "td"))
    {
        row.children_mut().remove(index);
    }
    let Some(value) = row.element_mut("td") else {
        return Ok(RowOutcome::Keep(row));
    };
    if value.has_attr("align") {
        value.set_attr("align", "center");
        value.set_attr("colspan", "2");
    }
    let text = value.text().unwrap_or_default().to_string();

    if has_field("defaultValue") && ctx.type_name == PARAMETER_TYPE {
        let mut tokens = strip_first_last(&text).split(' ');
        let name = tokens.next().unwrap_or_default().to_string();
        let rest: Vec<&str> = tokens.collect();
        if let Some(title) = ctx.title_row.as_deref_mut().and_then(title_mut) {
            title.set_text(name);
        }
        value.set_text(format!("\"{}\"", rest.join(" ")));
    }

    if has_field("startedAtTime") {
        let raw = text.replace("^^xsd:dateTime", "");
        let started = parse_timestamp(strip_first_last(&raw))?;
        let cell = Element::with_text("td", started.format(TIME_FORMAT).to_string())
            .with_attr("align", "center")
            .with_attr("colspan", "2");
        return Ok(RowOutcome::Bottom(Element::new("tr").with_child(cell)));
    }

    let shown = strip_first_last(value.text().unwrap_or_default()).to_string();
    if ctx.type_name == "Action" && has_field("command") {
        value.set_text("");
        value.push(Element::with_text("B", shown));
    } else if ctx.type_name == "CommandInput" {
        value.set_text("");
        value.push(Element::new("B").with_child(Element::with_text("I", shown)));
    } else {
        value.set_text(shown);
    }
    Ok(RowOutcome::Keep(row))
}

/// Restyle one node. Returns `false` when the node's title has no entry in
/// the type map, in which case the node is left untouched.
pub fn customize_node(node: &mut DotNode, types: &TypeMap, styles: &StyleTable) -> RenderResult<bool> {
    let Some(markup) = node.label.as_deref() else {
        return Ok(false);
    };
    let mut table = LabelTree::parse(markup)?.into_root();
    let Some(title) = title_of(&table) else {
        return Ok(false);
    };
    let Some(type_name) = types.get(&title).map(String::as_str) else {
        tracing::debug!(node = %node.id, %title, "render: no type for node");
        return Ok(false);
    };
    if table.elements("tr").count() < 2 {
        return Err(RenderError::MissingTitleRow {
            node: node.id.clone(),
        });
    }
    let style = styles.lookup(type_name);

    let mut rows = Vec::new();
    let mut others = Vec::new();
    for child in std::mem::take(table.children_mut()) {
        match child {
            Node::Element(e) if e.name() == "tr" => rows.push(e),
            other => others.push(other),
        }
    }
    let mut rows = rows.into_iter();
    let (Some(mut title_row), Some(_identifier_row)) = (rows.next(), rows.next()) else {
        return Err(RenderError::MissingTitleRow {
            node: node.id.clone(),
        });
    };

    if let Some(td) = title_row.element_mut("td") {
        td.remove_attr("bgcolor");
    }
    if let Some(b) = title_mut(&mut title_row) {
        if type_name != PARAMETER_TYPE {
            b.set_text(type_name);
        }
        let current = b.text().unwrap_or_default().to_string();
        if current.starts_with(OUTPUT_PREFIX) && current != OUTPUT_PREFIX {
            b.set_text(&current[OUTPUT_PREFIX.len()..]);
        }
    }

    let mut body = Vec::new();
    let mut bottom = Vec::new();
    {
        let mut ctx = RowContext {
            type_name,
            title_row: Some(&mut title_row),
        };
        for row in rows {
            match customize_row(row, &mut ctx)? {
                RowOutcome::Keep(row) => body.push(row),
                RowOutcome::Bottom(row) => bottom.push(row),
            }
        }
    }

    table.set_attr("border", &style.table_border.to_string());
    table.set_attr("cellborder", "0");
    let children = table.children_mut();
    children.extend(others);
    if !style.drop_title_row {
        children.push(Node::Element(title_row));
    }
    children.extend(body.into_iter().map(Node::Element));
    children.extend(bottom.into_iter().map(Node::Element));

    node.set_attr("style", "filled");
    node.set_attr("shape", style.shape.as_str());
    if let Some(color) = style.color {
        node.set_attr("color", color);
    }
    node.label = Some(table.to_string());
    tracing::debug!(node = %node.id, %type_name, "render: node styled");
    Ok(true)
}

/// Restyle every edge and node of `dot`.
pub fn customize_graph(dot: &mut DotGraph, types: &TypeMap, styles: &StyleTable) -> RenderResult<()> {
    for edge in dot.edges_mut() {
        customize_edge(edge)?;
    }
    let mut styled = 0usize;
    for node in dot.nodes_mut() {
        if customize_node(node, types, styles)? {
            styled += 1;
        }
    }
    tracing::info!(styled, nodes = dot.node_count(), "render: diagram customized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with(title: &str, rows: &[(&str, &str)]) -> DotNode {
        let mut label = format!(
            "<table color='#666666' cellborder='0' cellspacing='0' border='1'>\
             <tr><td colspan='2' bgcolor='grey'><B>{title}</B></td></tr>\
             <tr><td href='https://e.org/x' bgcolor='#eeeeee' colspan='2'>\
             <font point-size='10' color='#6666ff'>https://e.org/x</font></td></tr>"
        );
        for (field, value) in rows {
            label.push_str(&format!(
                "<tr><td align='left'>{field}</td><td align='left'>{value}</td></tr>"
            ));
        }
        label.push_str("</table>");
        let mut node = DotNode::new("node0");
        node.label = Some(label);
        node
    }

    fn types(pairs: &[(&str, &str)]) -> TypeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn rows_of(node: &DotNode) -> Vec<String> {
        let tree = LabelTree::parse(node.label.as_deref().unwrap()).unwrap();
        tree.root().elements("tr").map(|r| r.to_string()).collect()
    }

    #[test]
    fn edge_label_keeps_local_name() {
        let mut edge = DotEdge::default();
        edge.label = Some("<font point-size='10' color='#336633'>renku:hasInputs</font>".into());
        customize_edge(&mut edge).unwrap();
        assert_eq!(
            edge.label.as_deref(),
            Some("<font point-size=\"10\" color=\"#336633\">hasInputs</font>")
        );
    }

    #[test]
    fn untyped_node_is_untouched() {
        let mut node = node_with("something", &[("schema:defaultValue", "&quot;x&quot;")]);
        let before = node.clone();
        let styled = customize_node(&mut node, &TypeMap::new(), &StyleTable::standard()).unwrap();
        assert!(!styled);
        assert_eq!(node, before);
    }

    #[test]
    fn image_output_is_white_and_bordered() {
        let mut node = node_with("result", &[("schema:defaultValue", "&quot;result.png&quot;")]);
        let map = types(&[("result", "CommandOutputImage")]);
        assert!(customize_node(&mut node, &map, &StyleTable::standard()).unwrap());
        assert_eq!(node.attr("color"), Some("#FFFFFF"));
        assert_eq!(node.attr("style"), Some("filled"));
        assert_eq!(node.attr("shape"), Some("box"));
        let tree = LabelTree::parse(node.label.as_deref().unwrap()).unwrap();
        assert_eq!(tree.root().attr("border"), Some("1"));
        assert_eq!(
            rows_of(&node),
            vec![
                "<tr><td colspan=\"2\"><B>Image</B></td></tr>",
                "<tr><td align=\"center\" colspan=\"2\">result.png</td></tr>",
            ]
        );
    }

    #[test]
    fn action_drops_title_and_bolds_command() {
        let mut node = node_with(
            "plan",
            &[
                ("renku:command", "&quot;papermill&quot;"),
                ("prov:startedAtTime", "&quot;2021-01-01T00:00:00&quot;^^xsd:dateTime"),
                ("schema:description", "&quot;d&quot;"),
            ],
        );
        let map = types(&[("plan", "Action")]);
        customize_node(&mut node, &map, &StyleTable::standard()).unwrap();
        assert_eq!(node.attr("shape"), Some("diamond"));
        assert_eq!(node.attr("color"), Some("#D5C15D"));
        assert_eq!(
            rows_of(&node),
            vec![
                "<tr><td align=\"center\" colspan=\"2\"><B>papermill</B></td></tr>",
                "<tr><td align=\"center\" colspan=\"2\">d</td></tr>",
                "<tr><td align=\"center\" colspan=\"2\">2021-01-01 00:00:00</td></tr>",
            ]
        );
    }

    #[test]
    fn input_value_is_bold_italic() {
        let mut node = node_with("in", &[("schema:defaultValue", "&quot;nb.ipynb&quot;")]);
        let map = types(&[("in", "CommandInput")]);
        customize_node(&mut node, &map, &StyleTable::standard()).unwrap();
        assert_eq!(
            rows_of(&node),
            vec!["<tr><td align=\"center\" colspan=\"2\"><B><I>nb.ipynb</I></B></td></tr>"]
        );
    }

    #[test]
    fn parameter_title_comes_from_value() {
        let mut node = node_with("p", &[("schema:defaultValue", "&quot;--ra 10.5&quot;")]);
        let map = types(&[("p", "CommandParameter")]);
        customize_node(&mut node, &map, &StyleTable::standard()).unwrap();
        assert_eq!(node.attr("color"), Some("#6262be"));
        assert_eq!(
            rows_of(&node),
            vec![
                "<tr><td colspan=\"2\"><B>--ra</B></td></tr>",
                "<tr><td align=\"center\" colspan=\"2\">10.5</td></tr>",
            ]
        );
    }

    #[test]
    fn plain_output_keeps_full_title() {
        let mut node = node_with("o", &[]);
        let map = types(&[("o", "CommandOutput")]);
        customize_node(&mut node, &map, &StyleTable::standard()).unwrap();
        assert_eq!(node.attr("color"), Some("#FFFF00"));
        assert_eq!(rows_of(&node), vec!["<tr><td colspan=\"2\"><B>CommandOutput</B></td></tr>"]);
    }

    #[test]
    fn bad_timestamp_is_an_error() {
        let mut node = node_with("plan", &[("prov:startedAtTime", "&quot;yesterday&quot;")]);
        let map = types(&[("plan", "Action")]);
        let err = customize_node(&mut node, &map, &StyleTable::standard()).unwrap_err();
        assert!(matches!(err, RenderError::Timestamp { .. }));
    }

    #[test]
    fn single_row_table_is_an_error() {
        let mut node = DotNode::new("node3");
        node.label = Some("<table><tr><td bgcolor='grey'><B>o</B></td></tr></table>".into());
        let map = types(&[("o", "CommandOutput")]);
        let err = customize_node(&mut node, &map, &StyleTable::standard()).unwrap_err();
        assert!(matches!(err, RenderError::MissingTitleRow { .. }));
    }

    #[test]
    fn timestamps() {
        let expected = "2021-01-01 12:30:00";
        for input in [
            "2021-01-01T12:30:00",
            "2021-01-01T12:30:00.250",
            "2021-01-01T12:30:00+02:00",
            "2021-01-01 12:30:00",
        ] {
            assert_eq!(parse_timestamp(input).unwrap().format(TIME_FORMAT).to_string(), expected);
        }
        assert_eq!(
            parse_timestamp("2021-01-01").unwrap().format(TIME_FORMAT).to_string(),
            "2021-01-01 00:00:00"
        );
    }
}
