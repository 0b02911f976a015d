//! md2rst-core: render CommonMark document trees as reStructuredText
//!
//! This crate provides:
//! - CommonMark document tree types, loadable from a parser's JSON dump
//! - A depth-first walker yielding entry/exit events
//! - The reStructuredText renderer
//!
//! ## Example
//!
//! ```rust
//! use md2rst_core::{Node, RenderOptions, render};
//!
//! let doc = Node::document(vec![
//!     Node::heading(1, vec![Node::text("Hello")]),
//!     Node::paragraph(vec![Node::text("Use "), Node::code("inline code"), Node::text(".")]),
//! ]);
//!
//! let rst = render(&doc, &RenderOptions::default());
//! assert!(rst.contains("Hello\n#####"));
//! assert!(rst.contains("Use ``inline code``."));
//! ```

pub mod error;
pub mod node;
pub mod renderer;
pub mod walker;

pub use error::{OptionsError, TreeError};
pub use node::{ListData, ListType, Node, NodeKind};
pub use renderer::{HEADING_CHARS, RenderOptions, Renderer, heading_char, render};
pub use walker::{Event, Walker};
