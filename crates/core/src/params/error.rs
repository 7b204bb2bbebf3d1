//! Parameter error types.

use thiserror::Error;

/// Structural parameter errors. Always fatal to the current report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// The flat parameter list is not made of whole triples.
    #[error("Parameter list has {len} items, expected a multiple of 3")]
    MalformedTriples {
        /// Number of items received.
        len: usize,
    },

    /// A parameter name is missing, blank, or not a string.
    #[error("Parameter name at position {position} is empty")]
    EmptyName {
        /// Zero-based index of the offending triple.
        position: usize,
    },

    /// The same name (case-insensitive) was supplied twice.
    #[error("Duplicate parameter: {0}")]
    DuplicateName(String),

    /// A type tag or value could not be converted.
    #[error("Type mismatch for parameter '{name}': {reason}")]
    TypeMismatch {
        /// Parameter name.
        name: String,
        /// What failed to convert.
        reason: String,
    },

    /// The request does not name a report.
    #[error("Report name is empty")]
    EmptyReportName,
}

impl ParameterError {
    /// Create a type mismatch error.
    #[must_use]
    pub fn type_mismatch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
