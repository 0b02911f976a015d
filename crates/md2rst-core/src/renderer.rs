//! Document tree to reStructuredText renderer
//!
//! Walks the tree once, depth-first, and writes RST to a string buffer.
//! Indentation is a single running depth: block quotes, list items and the
//! image alt-text block raise it on entry and lower it by the same amount on
//! exit. The depth is only applied when text starts a fresh line, so handlers
//! never need to know whether they continue a line or begin one.

use crate::error::OptionsError;
use crate::node::{ListType, Node, NodeKind};
use crate::walker::Event;

/// Underline characters for heading levels 1 to 6, outermost first
pub const HEADING_CHARS: [char; 6] = ['#', '*', '=', '-', '^', '"'];

/// Indent width of block quotes, image options and code block bodies
const BLOCK_INDENT: usize = 4;

/// Options for the RST renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// String repeated once per indentation level (default: one space)
    pub indent_unit: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent_unit: " ".to_string(),
        }
    }
}

impl RenderOptions {
    /// Options with a custom indentation unit such as `"\t"`
    pub fn with_indent(unit: impl Into<String>) -> Result<Self, OptionsError> {
        let indent_unit = unit.into();
        if indent_unit.is_empty() {
            return Err(OptionsError::EmptyIndent);
        }
        Ok(Self { indent_unit })
    }
}

/// Render a document tree as reStructuredText
pub fn render(root: &Node, options: &RenderOptions) -> String {
    Renderer::new(options).render(root)
}

/// RST renderer state
///
/// One instance renders one tree at a time; [`Renderer::render`] resets the
/// state first, so an instance can be reused sequentially.
pub struct Renderer<'a> {
    options: &'a RenderOptions,
    output: String,
    /// Current indentation in multiples of the indent unit
    indent_depth: usize,
    /// Last character written; `None` before any output
    last_char: Option<char>,
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            output: String::new(),
            indent_depth: 0,
            last_char: None,
        }
    }

    pub fn render(&mut self, root: &Node) -> String {
        self.output.clear();
        self.indent_depth = 0;
        self.last_char = None;

        for event in root.walker() {
            self.visit(event);
        }

        std::mem::take(&mut self.output)
    }

    fn visit(&mut self, event: Event<'_>) {
        let Event {
            node,
            entering,
            parent,
        } = event;

        match node.kind {
            NodeKind::Document => {}
            NodeKind::Softbreak => self.cr(),
            NodeKind::Linebreak => {
                self.cr();
                self.cr();
            }
            NodeKind::Text => self.emit(literal(node)),
            NodeKind::Emphasis => self.emit("*"),
            NodeKind::Strong => self.emit("**"),
            NodeKind::Paragraph => self.paragraph(parent),
            NodeKind::Link => self.link(node, entering),
            NodeKind::Image => self.image(node, entering),
            NodeKind::Code => {
                self.emit("``");
                self.emit(literal(node));
                self.emit("``");
            }
            NodeKind::CodeBlock => self.code_block(node),
            NodeKind::List => {
                if entering {
                    self.cr();
                }
            }
            NodeKind::Item => self.item(node, parent, entering),
            NodeKind::BlockQuote => {
                if entering {
                    self.indent(BLOCK_INDENT);
                } else {
                    self.dedent(BLOCK_INDENT);
                }
            }
            NodeKind::Heading => self.heading(node, entering),
            NodeKind::Unknown => {
                if entering {
                    tracing::trace!(children = node.children.len(), "skipping unknown node");
                }
            }
        }
    }

    // Block nodes

    /// Paragraphs are framed by newlines on both passes, except directly
    /// inside a list item where the item tag already starts the line.
    fn paragraph(&mut self, parent: Option<&Node>) {
        if parent.is_some_and(|p| p.kind == NodeKind::Item) {
            return;
        }
        self.cr();
    }

    fn heading(&mut self, node: &Node, entering: bool) {
        if entering {
            self.cr();
            return;
        }

        let title_len = node
            .first_child()
            .and_then(|c| c.literal.as_deref())
            .map_or(0, |t| t.chars().count());
        let banner = heading_char(node.level).to_string().repeat(title_len);

        self.cr();
        self.emit(&banner);
        self.cr();
    }

    fn code_block(&mut self, node: &Node) {
        let mut directive = String::from(".. code::");
        if let Some(lang) = node.info.as_deref().and_then(|i| i.split_whitespace().next()) {
            directive.push(' ');
            directive.push_str(lang);
        }
        let body = self.indent_block(literal(node), BLOCK_INDENT);

        self.cr();
        self.emit(&directive);
        self.cr();
        self.cr();
        self.emit(&body);
        self.cr();
    }

    fn item(&mut self, node: &Node, parent: Option<&Node>, entering: bool) {
        let list_type = node
            .list_data
            .as_ref()
            .or_else(|| parent.and_then(|p| p.list_data.as_ref()))
            .map(|d| d.list_type)
            .unwrap_or_default();
        let tag = match list_type {
            ListType::Bullet => "* ",
            ListType::Ordered => "#. ",
        };

        if entering {
            self.emit(tag);
            self.indent(tag.chars().count());
        } else {
            self.dedent(tag.chars().count());
            self.cr();
        }
    }

    // Inline nodes

    fn link(&mut self, node: &Node, entering: bool) {
        if entering {
            self.emit("`");
        } else {
            self.emit(&format!(" <{}>`_", destination(node)));
        }
    }

    fn image(&mut self, node: &Node, entering: bool) {
        if entering {
            self.emit(&format!(".. image:: {}", destination(node)));
            self.cr();
            self.indent(BLOCK_INDENT);
            self.emit(":alt: ");
        } else {
            self.dedent(BLOCK_INDENT);
        }
    }

    // Output primitives

    /// Append `s`, prefixed with the current indentation when it starts a
    /// fresh line. A bare newline is never indented.
    fn emit(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if s != "\n" && self.at_line_start() {
            let prefix = self.options.indent_unit.repeat(self.indent_depth);
            self.output.push_str(&prefix);
        }
        self.output.push_str(s);
        self.last_char = s.chars().last();
    }

    fn cr(&mut self) {
        self.emit("\n");
    }

    fn at_line_start(&self) -> bool {
        matches!(self.last_char, None | Some('\n'))
    }

    /// Prefix every line of `text` with `width` indent units.
    ///
    /// Used for literal blocks, which are indented relative to their
    /// directive rather than by the running depth.
    fn indent_block(&self, text: &str, width: usize) -> String {
        let indent = self.options.indent_unit.repeat(width);
        text.replace("\r\n", "\n")
            .split_terminator(['\r', '\n'])
            .map(|line| format!("{indent}{line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn indent(&mut self, width: usize) {
        self.indent_depth += width;
    }

    fn dedent(&mut self, width: usize) {
        self.indent_depth = self.indent_depth.saturating_sub(width);
    }
}

/// Underline character for a heading level, falling back to the innermost
/// character for levels outside the table (including zero and negatives).
pub fn heading_char(level: Option<i64>) -> char {
    level
        .and_then(|l| l.checked_sub(1))
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| HEADING_CHARS.get(i))
        .copied()
        .unwrap_or(HEADING_CHARS[HEADING_CHARS.len() - 1])
}

fn literal(node: &Node) -> &str {
    node.literal.as_deref().unwrap_or_default()
}

fn destination(node: &Node) -> &str {
    node.destination.as_deref().unwrap_or_default()
}
