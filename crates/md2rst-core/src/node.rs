//! CommonMark document tree types
//!
//! The tree is produced by an external Markdown parser. Node kinds and
//! attribute names follow the CommonMark reference implementations
//! (`type`, `literal`, `destination`, `info`, `level`, `list_data`), so a
//! parser's JSON dump can be deserialized directly.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// Kind of a document node
///
/// Kind names the renderer does not know deserialize to [`NodeKind::Unknown`]
/// so trees from parser extensions still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum NodeKind {
    // Block nodes
    Document,
    Paragraph,
    Heading,
    BlockQuote,
    List,
    Item,
    CodeBlock,

    // Inline nodes
    Text,
    Softbreak,
    Linebreak,
    Emphasis,
    Strong,
    Link,
    Image,
    Code,

    Unknown,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::BlockQuote => "block_quote",
            NodeKind::List => "list",
            NodeKind::Item => "item",
            NodeKind::CodeBlock => "code_block",
            NodeKind::Text => "text",
            NodeKind::Softbreak => "softbreak",
            NodeKind::Linebreak => "linebreak",
            NodeKind::Emphasis => "emph",
            NodeKind::Strong => "strong",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
            NodeKind::Code => "code",
            NodeKind::Unknown => "unknown",
        }
    }
}

impl FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "document" => NodeKind::Document,
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading,
            "block_quote" => NodeKind::BlockQuote,
            "list" => NodeKind::List,
            "item" => NodeKind::Item,
            "code_block" => NodeKind::CodeBlock,
            "text" => NodeKind::Text,
            "softbreak" => NodeKind::Softbreak,
            "linebreak" => NodeKind::Linebreak,
            "emph" | "emphasis" => NodeKind::Emphasis,
            "strong" => NodeKind::Strong,
            "link" => NodeKind::Link,
            "image" => NodeKind::Image,
            "code" => NodeKind::Code,
            _ => NodeKind::Unknown,
        })
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<NodeKind> for &'static str {
    fn from(kind: NodeKind) -> Self {
        kind.as_str()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// List flavor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[default]
    Bullet,
    Ordered,
}

/// List attributes (present on list nodes, optionally on items)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListData {
    #[serde(rename = "type", default)]
    pub list_type: ListType,
    /// First number of an ordered list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    /// Delimiter of an ordered list (`period` or `paren`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub tight: bool,
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Raw text of text, code and code_block nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    /// Target of link and image nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Info string of a fenced code block (`python extra`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// Heading depth, 1-based. Any JSON number loads; values outside `i64`
    /// saturate.
    #[serde(
        default,
        deserialize_with = "deserialize_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_data: Option<ListData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.map(|n| {
        n.as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(i64::MAX)
    }))
}

impl Node {
    /// Bare node of the given kind with no attributes
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            literal: None,
            destination: None,
            title: None,
            info: None,
            level: None,
            list_data: None,
            children: Vec::new(),
        }
    }

    fn container(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::new(kind)
        }
    }

    fn leaf(kind: NodeKind, literal: impl Into<String>) -> Self {
        Self {
            literal: Some(literal.into()),
            ..Self::new(kind)
        }
    }

    /// First child, if any
    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Whether the node is visited on exit as well as on entry.
    ///
    /// Unknown nodes are containers when they carry children, so content
    /// nested in extension nodes still reaches the output.
    pub fn is_container(&self) -> bool {
        match self.kind {
            NodeKind::Document
            | NodeKind::Paragraph
            | NodeKind::Heading
            | NodeKind::BlockQuote
            | NodeKind::List
            | NodeKind::Item
            | NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Link
            | NodeKind::Image => true,
            NodeKind::CodeBlock
            | NodeKind::Text
            | NodeKind::Softbreak
            | NodeKind::Linebreak
            | NodeKind::Code => false,
            NodeKind::Unknown => !self.children.is_empty(),
        }
    }

    /// Load a tree from its JSON form
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a tree from a reader holding its JSON form
    pub fn from_reader(reader: impl Read) -> Result<Self, TreeError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serialize the tree to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// Convenience constructors
impl Node {
    pub fn document(children: Vec<Node>) -> Self {
        Self::container(NodeKind::Document, children)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Text, s)
    }

    pub fn softbreak() -> Self {
        Self::new(NodeKind::Softbreak)
    }

    pub fn linebreak() -> Self {
        Self::new(NodeKind::Linebreak)
    }

    pub fn emphasis(children: Vec<Node>) -> Self {
        Self::container(NodeKind::Emphasis, children)
    }

    pub fn strong(children: Vec<Node>) -> Self {
        Self::container(NodeKind::Strong, children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::container(NodeKind::Paragraph, children)
    }

    pub fn link(destination: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..Self::container(NodeKind::Link, children)
        }
    }

    pub fn link_with_title(
        destination: impl Into<String>,
        title: impl Into<String>,
        children: Vec<Node>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::link(destination, children)
        }
    }

    /// Image node; `alt` holds the inline nodes of the alt text
    pub fn image(destination: impl Into<String>, alt: Vec<Node>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..Self::container(NodeKind::Image, alt)
        }
    }

    /// Inline code span
    pub fn code(literal: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Code, literal)
    }

    pub fn code_block(info: Option<String>, literal: impl Into<String>) -> Self {
        Self {
            info,
            ..Self::leaf(NodeKind::CodeBlock, literal)
        }
    }

    pub fn bullet_list(items: Vec<Node>) -> Self {
        Self::list(ListType::Bullet, items)
    }

    pub fn ordered_list(items: Vec<Node>) -> Self {
        Self::list(ListType::Ordered, items)
    }

    fn list(list_type: ListType, items: Vec<Node>) -> Self {
        Self {
            list_data: Some(ListData {
                list_type,
                start: (list_type == ListType::Ordered).then_some(1),
                delimiter: (list_type == ListType::Ordered).then(|| "period".to_string()),
                tight: true,
            }),
            ..Self::container(NodeKind::List, items)
        }
    }

    /// List item; takes its list type from the enclosing list
    pub fn item(children: Vec<Node>) -> Self {
        Self::container(NodeKind::Item, children)
    }

    pub fn block_quote(children: Vec<Node>) -> Self {
        Self::container(NodeKind::BlockQuote, children)
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        Self {
            level: Some(i64::from(level)),
            ..Self::container(NodeKind::Heading, children)
        }
    }
}
