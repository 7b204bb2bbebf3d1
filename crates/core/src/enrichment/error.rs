//! Enrichment error types.

use thiserror::Error;

use crate::params::ParameterError;

/// Errors raised by a lookup collaborator.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No entry exists for the key.
    #[error("No {kind} named for {key}")]
    NotFound {
        /// Lookup table.
        kind: &'static str,
        /// Requested key.
        key: String,
    },

    /// The lookup backend failed.
    #[error("Lookup unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

/// Failure of a single derivation. Always reported as a warning.
#[derive(Debug, Error)]
pub enum DerivationError {
    /// The lookup collaborator failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The month parameter is not an integer between 1 and 12.
    #[error("Month parameter is not a month number: {0}")]
    InvalidMonth(String),
}

/// Errors that abort enrichment.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// Caller parameters are structurally invalid.
    #[error(transparent)]
    Parameters(#[from] ParameterError),

    /// Arbitration refused to continue after a reported issue.
    #[error("Enrichment halted during {stage}")]
    Halted {
        /// Step that reported the issue.
        stage: &'static str,
    },
}
