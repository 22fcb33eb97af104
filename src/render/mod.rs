//! Diagram rendering of an annotated graph.
//!
//! - [`rdf_to_dot`] draws every resource as a table-labelled node
//! - [`customize_graph`] restyles the diagram from the type map
//! - [`DotGraph::write_image`] hands the DOT text to Graphviz

pub mod customize;
pub mod dot;
pub mod label;
pub mod rdf2dot;
pub mod style;

pub use customize::{customize_edge, customize_graph, customize_node};
pub use dot::{DotEdge, DotGraph, DotNode};
pub use label::{Element, LabelTree};
pub use rdf2dot::rdf_to_dot;
pub use style::{NodeStyle, Shape, StyleTable};
