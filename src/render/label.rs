//! Graphviz HTML-like labels as a small element tree.
//!
//! Parsing uses `quick-xml`; text is kept in [`Node::Text`] children, and
//! [`Element::text`] reads the leading text of an element the way an XML
//! tree API would. Serialization writes double-quoted attributes and escapes
//! `&`, `<` and `>` in text.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{RenderError, RenderResult};

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// `<name>text</name>`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.set_text(text);
        element
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// Set `key`, keeping its position if already present.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(index).1)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Child elements named `name`, in document order.
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |child| match child {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// First child element named `name`.
    pub fn element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|child| match child {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Text before the first child element.
    pub fn text(&self) -> Option<&str> {
        match self.children.first() {
            Some(Node::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Replace the leading text; an empty string removes it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        let has_text = matches!(self.children.first(), Some(Node::Text(_)));
        match (has_text, text.is_empty()) {
            (true, true) => {
                self.children.remove(0);
            }
            (true, false) => self.children[0] = Node::Text(text),
            (false, true) => {}
            (false, false) => self.children.insert(0, Node::Text(text)),
        }
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&quick_xml::escape::escape(value.as_str()));
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write(out),
                Node::Text(text) => out.push_str(&quick_xml::escape::partial_escape(text.as_str())),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write(&mut out);
        f.write_str(&out)
    }
}

/// A parsed label with a single root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTree {
    root: Element,
}

fn label_error(message: impl fmt::Display) -> RenderError {
    RenderError::Label {
        message: message.to_string(),
    }
}

fn element_from(start: &BytesStart<'_>) -> RenderResult<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(label_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(label_error)?;
        element.attrs.push((key, value.into_owned()));
    }
    Ok(element)
}

fn push_text(parent: &mut Element, text: &str) {
    if let Some(Node::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}

impl LabelTree {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse label markup. Surrounding whitespace is ignored.
    pub fn parse(markup: &str) -> RenderResult<Self> {
        let mut reader = Reader::from_str(markup.trim());
        reader.trim_text(false);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        let mut attach = |stack: &mut Vec<Element>, element: Element| -> RenderResult<()> {
            match stack.last_mut() {
                Some(parent) => parent.children.push(Node::Element(element)),
                None if root.is_none() => root = Some(element),
                None => return Err(label_error("more than one root element")),
            }
            Ok(())
        };

        loop {
            match reader.read_event().map_err(label_error)? {
                Event::Start(start) => stack.push(element_from(&start)?),
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    attach(&mut stack, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| label_error("unbalanced end tag"))?;
                    attach(&mut stack, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(label_error)?;
                    match stack.last_mut() {
                        Some(parent) => push_text(parent, &text),
                        None if text.trim().is_empty() => {}
                        None => return Err(label_error("text outside the root element")),
                    }
                }
                Event::CData(data) => {
                    let bytes = data.into_inner();
                    if let Some(parent) = stack.last_mut() {
                        push_text(parent, &String::from_utf8_lossy(&bytes));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        if !stack.is_empty() {
            return Err(label_error("unclosed element"));
        }
        root.map(Self::new)
            .ok_or_else(|| label_error("empty label"))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }
}

impl fmt::Display for LabelTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}
