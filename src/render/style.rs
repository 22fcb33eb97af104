//! Per-type node styling.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Box,
    Diamond,
    Ellipse,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Diamond => "diamond",
            Self::Ellipse => "ellipse",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a node of one semantic type is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub shape: Shape,
    /// Fill color; `None` keeps Graphviz's default.
    pub color: Option<&'static str>,
    pub table_border: u8,
    /// Remove the title row once styling has been decided.
    pub drop_title_row: bool,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            shape: Shape::Box,
            color: None,
            table_border: 0,
            drop_title_row: false,
        }
    }
}

impl NodeStyle {
    fn colored(color: &'static str) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    fn shaped(shape: Shape, color: &'static str) -> Self {
        Self {
            shape,
            color: Some(color),
            ..Self::default()
        }
    }
}

/// Semantic type name → [`NodeStyle`]. Types without an entry get
/// [`NodeStyle::default`].
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: BTreeMap<String, NodeStyle>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock palette.
    pub fn standard() -> Self {
        let bordered_white = NodeStyle {
            table_border: 1,
            ..NodeStyle::colored("#FFFFFF")
        };
        let mut table = Self::new()
            .with(
                "Action",
                NodeStyle {
                    drop_title_row: true,
                    ..NodeStyle::shaped(Shape::Diamond, "#D5C15D")
                },
            )
            .with("CommandOutput", NodeStyle::colored("#FFFF00"))
            .with("CommandOutputImage", bordered_white)
            .with("CommandOutputFitsFile", bordered_white)
            .with("CommandOutputNotebook", NodeStyle::colored("#DBA3BC"))
            .with(
                "CommandInput",
                NodeStyle {
                    drop_title_row: true,
                    ..NodeStyle::colored("#DBA3BC")
                },
            )
            .with("CommandParameter", NodeStyle::colored("#6262be"))
            .with("AstroqueryModule", NodeStyle::shaped(Shape::Ellipse, "#00CC00"))
            // Three separate slots; `#6262bg` is not valid hex and is kept as is.
            .with("AstrophysicalObject", NodeStyle::shaped(Shape::Ellipse, "#6262be"))
            .with("AstrophysicalRegion", NodeStyle::shaped(Shape::Ellipse, "#6262bf"))
            .with("AstrophysicalImage", NodeStyle::shaped(Shape::Ellipse, "#6262bg"));
        for name in ["Angle", "SkyCoordinates", "Coordinates", "Position", "Pixels"] {
            table.insert(name, NodeStyle::colored("#1B81FB"));
        }
        table
    }

    pub fn with(mut self, type_name: &str, style: NodeStyle) -> Self {
        self.insert(type_name, style);
        self
    }

    pub fn insert(&mut self, type_name: &str, style: NodeStyle) {
        self.styles.insert(type_name.to_string(), style);
    }

    pub fn lookup(&self, type_name: &str) -> NodeStyle {
        self.styles.get(type_name).copied().unwrap_or_default()
    }
}
