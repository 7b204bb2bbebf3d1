//! Aggregation error types.

use thiserror::Error;

/// Errors raised by a data-source collaborator.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The named source does not exist.
    #[error("Data source not found: {0}")]
    NotFound(String),

    /// The source failed while executing.
    #[error("Data source execution failed: {0}")]
    Execution(String),

    /// The source did not answer in time.
    #[error("Data source timed out after {secs}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },

    /// A returned column could not be converted to a cell value.
    #[error("Cannot convert column {column}: {reason}")]
    Conversion {
        /// Offending column.
        column: String,
        /// Why conversion failed.
        reason: String,
    },

    /// A source name is blank or not a valid identifier.
    #[error("Invalid data source name: {0}")]
    InvalidName(String),
}

/// Errors that abort an aggregation.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The source list was empty.
    #[error("No data sources to aggregate")]
    NoSources,

    /// A source failed; no partial result is produced.
    #[error("Data source {source_name} failed")]
    SourceFailed {
        /// Name of the failing source.
        source_name: String,
        /// Underlying failure.
        #[source]
        cause: DataSourceError,
    },
}
