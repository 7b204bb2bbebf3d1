//! Template error types.

use thiserror::Error;

/// Errors raised while rendering a template.
///
/// Only [`InvalidTemplate`](Self::InvalidTemplate) and
/// [`Halted`](Self::Halted) escape [`TemplateEngine::render`](super::TemplateEngine::render);
/// the others skip the phase that raised them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template is empty or whitespace only.
    #[error("Template is empty")]
    InvalidTemplate,

    /// A header token names no column.
    #[error("Header token has an empty column reference")]
    EmptyHeaderReference,

    /// A row block has an empty dataset reference.
    #[error("Row block at offset {offset} has no dataset name")]
    MissingDatasetName {
        /// Byte offset of the row block.
        offset: usize,
    },

    /// A row block contains another row block.
    #[error("Row block for {outer} contains a nested row block for {inner}")]
    NestedRowBlock {
        /// Enclosing dataset.
        outer: String,
        /// Nested dataset.
        inner: String,
    },

    /// A row block has no matching closing tag.
    #[error("Row block for {0} is not terminated")]
    UnterminatedRowBlock(String),

    /// A conditional block contains another conditional block.
    #[error("Nested conditional at offset {offset}")]
    NestedConditional {
        /// Byte offset of the nested marker.
        offset: usize,
    },

    /// A conditional block has no end marker.
    #[error("Conditional at offset {offset} is not terminated")]
    UnterminatedConditional {
        /// Byte offset of the opening marker.
        offset: usize,
    },

    /// An else or end marker outside a conditional block.
    #[error("Unexpected {marker} marker at offset {offset}")]
    StrayMarker {
        /// The marker found.
        marker: &'static str,
        /// Byte offset of the marker.
        offset: usize,
    },

    /// A condition that is not of the form `field == value`.
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Arbitration refused to continue after a phase failed.
    #[error("Rendering halted in phase {phase}")]
    Halted {
        /// Phase that failed.
        phase: &'static str,
    },
}
