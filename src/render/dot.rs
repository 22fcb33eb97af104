//! Dot diagram intermediate: a petgraph `DiGraph` of labelled nodes and
//! edges, written out as DOT text and rendered through Graphviz.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::{RenderError, RenderResult};
use crate::graph::Term;

/// A diagram node. `label` holds HTML-like markup without the `< >` wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotNode {
    pub id: String,
    /// RDF term the node was drawn for.
    pub term: Option<Term>,
    pub attrs: BTreeMap<String, String>,
    pub label: Option<String>,
}

impl DotNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: None,
            attrs: BTreeMap::new(),
            label: None,
        }
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// A diagram edge. `label` holds HTML-like markup without the `< >` wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotEdge {
    pub attrs: BTreeMap<String, String>,
    pub label: Option<String>,
}

impl DotEdge {
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attrs.insert(key.to_string(), value.into());
    }
}

/// Directed diagram with stable node ids.
#[derive(Debug, Clone, Default)]
pub struct DotGraph {
    graph: DiGraph<DotNode, DotEdge>,
    /// Node id → index.
    node_index: HashMap<String, NodeIndex>,
    /// Defaults written as `node [ ... ]`.
    pub node_defaults: BTreeMap<String, String>,
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn write_attrs(out: &mut String, attrs: &BTreeMap<String, String>, label: Option<&str>) {
    let mut parts: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!("{k}={}", quote(v)))
        .collect();
    if let Some(label) = label {
        parts.push(format!("label=< {label} >"));
    }
    let _ = write!(out, " [ {} ]", parts.join(", "));
}

impl DotGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `node`, or return the index of the node already using its id.
    pub fn ensure_node(&mut self, node: DotNode) -> NodeIndex {
        if let Some(idx) = self.node_index.get(&node.id) {
            return *idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        idx
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DotEdge) {
        self.graph.add_edge(from, to, edge);
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&DotNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut DotNode> {
        self.graph.node_weight_mut(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    pub fn find_node(&self, id: &str) -> Option<&DotNode> {
        self.index_of(id).and_then(|idx| self.node(idx))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DotNode> {
        self.graph.node_weights()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut DotNode> {
        self.graph.node_weights_mut()
    }

    pub fn edges(&self) -> impl Iterator<Item = &DotEdge> {
        self.graph.edge_weights()
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut DotEdge> {
        self.graph.edge_weights_mut()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// DOT source text.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph {\n");
        if !self.node_defaults.is_empty() {
            out.push_str(" node");
            write_attrs(&mut out, &self.node_defaults, None);
            out.push_str(" ;\n");
        }
        for node in self.graph.node_weights() {
            let _ = write!(out, "  {}", node.id);
            write_attrs(&mut out, &node.attrs, node.label.as_deref());
            out.push_str(" ;\n");
        }
        for edge in self.graph.edge_references() {
            let from = &self.graph[edge.source()].id;
            let to = &self.graph[edge.target()].id;
            let _ = write!(out, "  {from} -> {to}");
            write_attrs(&mut out, &edge.weight().attrs, edge.weight().label.as_deref());
            out.push_str(" ;\n");
        }
        out.push_str("}\n");
        out
    }

    /// Render to `path` with Graphviz; the output format is the file
    /// extension (`png` when there is none).
    pub fn write_image(&self, path: &Path, binary: &str) -> RenderResult<()> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let spawn_error = |source| RenderError::GraphvizSpawn {
            binary: binary.to_string(),
            source,
        };

        let mut child = Command::new(binary)
            .arg(format!("-T{format}"))
            .arg("-o")
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(self.to_dot().as_bytes()) {
                drop(stdin);
                // Reap the child before reporting; it may still be running.
                let _ = child.kill();
                let _ = child.wait();
                return Err(spawn_error(e));
            }
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(RenderError::GraphvizFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        tracing::info!(path = %path.display(), format, "render: image written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_node_dedups_by_id() {
        let mut dot = DotGraph::new();
        let a = dot.ensure_node(DotNode::new("node0"));
        let b = dot.ensure_node(DotNode::new("node0"));
        assert_eq!(a, b);
        assert_eq!(dot.node_count(), 1);
    }

    #[test]
    fn dot_text() {
        let mut dot = DotGraph::new();
        dot.node_defaults
            .insert("fontname".into(), "DejaVu Sans".into());
        let mut n0 = DotNode::new("node0");
        n0.set_attr("color", "#FFFF00");
        n0.label = Some("<B>x</B>".into());
        let a = dot.ensure_node(n0);
        let b = dot.ensure_node(DotNode::new("node1"));
        let mut edge = DotEdge::default();
        edge.label = Some("<font>p</font>".into());
        dot.add_edge(a, b, edge);

        let text = dot.to_dot();
        assert!(text.starts_with("digraph {\n node [ fontname=\"DejaVu Sans\" ] ;\n"));
        assert!(text.contains("  node0 [ color=\"#FFFF00\", label=< <B>x</B> > ] ;\n"));
        assert!(text.contains("  node0 -> node1 [ label=< <font>p</font> > ] ;\n"));
        assert!(text.ends_with("}\n"));
    }

    #[cfg(unix)]
    #[test]
    fn graphviz_that_ignores_input_is_reported() {
        let mut dot = DotGraph::new();
        for i in 0..5000 {
            let mut node = DotNode::new(format!("node{i}"));
            node.label = Some(format!("<B>{}</B>", "x".repeat(100)));
            dot.ensure_node(node);
        }
        let dir = tempfile::TempDir::new().unwrap();
        let err = dot.write_image(&dir.path().join("g.png"), "true").unwrap_err();
        assert!(matches!(err, RenderError::GraphvizSpawn { .. }));
    }

    #[test]
    fn missing_graphviz_binary() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = DotGraph::new()
            .write_image(&dir.path().join("g.png"), "definitely-not-graphviz-binary")
            .unwrap_err();
        assert!(matches!(err, RenderError::GraphvizSpawn { .. }));
    }
}
