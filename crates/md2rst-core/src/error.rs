//! Error types for md2rst-core

use thiserror::Error;

/// Error raised while loading a serialized document tree
#[derive(Debug, Error)]
pub enum TreeError {
    /// The input is not JSON, or does not have the shape of a node tree
    #[error("invalid document tree: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error raised while building [`RenderOptions`](crate::RenderOptions)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("indent unit must not be empty")]
    EmptyIndent,
}
