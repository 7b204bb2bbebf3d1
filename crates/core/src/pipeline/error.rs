//! Pipeline error types.

use folio_shared::AppError;
use thiserror::Error;

use crate::aggregation::AggregationError;
use crate::enrichment::EnrichmentError;
use crate::params::ParameterError;
use crate::template::TemplateError;

/// Errors raised by the report catalog (definitions, templates, mappings).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored definition cannot be used.
    #[error("Invalid definition for {name}: {reason}")]
    InvalidDefinition {
        /// Report name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors raised by an output backend.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The rendering service could not be reached.
    #[error("Rendering service request failed: {0}")]
    Request(String),

    /// The rendering service answered with an error status.
    #[error("Rendering service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The rendering service did not answer in time.
    #[error("Rendering service timed out after {secs}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },

    /// The payload could not be encoded.
    #[error("Cannot encode document: {0}")]
    Encoding(String),
}

/// Fatal failure of a report execution.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No report definition with this name.
    #[error("Report not found: {0}")]
    ReportNotFound(String),

    /// The report has no template, so it cannot be rendered as PDF.
    #[error("Template not found for report {0}")]
    TemplateNotFound(String),

    /// Caller parameters are structurally invalid.
    #[error("Invalid parameters: {0}")]
    Parameters(#[from] ParameterError),

    /// A data source failed.
    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// The template could not be rendered.
    #[error("Template rendering failed: {0}")]
    Template(#[source] TemplateError),

    /// The report catalog failed.
    #[error("Report store failed: {0}")]
    Store(#[from] StoreError),

    /// The output backend failed.
    #[error("Output backend failed: {0}")]
    Output(#[from] OutputError),

    /// Arbitration refused to continue.
    #[error("Report halted during {stage}")]
    Halted {
        /// Step that reported the breaking issue.
        stage: &'static str,
    },

    /// Pipeline settings are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl PipelineError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ReportNotFound(_) => "REPORT_NOT_FOUND",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::Parameters(_) => "INVALID_PARAMETERS",
            Self::Aggregation(_) => "DATA_SOURCE_FAILED",
            Self::Template(_) => "TEMPLATE_FAILED",
            Self::Store(_) => "STORE_FAILED",
            Self::Output(_) => "OUTPUT_FAILED",
            Self::Halted { .. } => "REPORT_HALTED",
            Self::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
        }
    }
}

impl From<EnrichmentError> for PipelineError {
    fn from(error: EnrichmentError) -> Self {
        match error {
            EnrichmentError::Parameters(e) => Self::Parameters(e),
            EnrichmentError::Halted { stage } => Self::Halted { stage },
        }
    }
}

impl From<TemplateError> for PipelineError {
    fn from(error: TemplateError) -> Self {
        match error {
            TemplateError::Halted { phase } => Self::Halted { stage: phase },
            other => Self::Template(other),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(error: PipelineError) -> Self {
        let message = error.to_string();
        match error {
            PipelineError::ReportNotFound(_) | PipelineError::TemplateNotFound(_) => {
                Self::NotFound(message)
            }
            PipelineError::Parameters(_) => Self::Validation(message),
            PipelineError::Aggregation(_) | PipelineError::Output(_) => Self::Upstream(message),
            PipelineError::Halted { .. } => Self::Halted(message),
            PipelineError::InvalidConfiguration(_) => Self::Configuration(message),
            PipelineError::Template(_) | PipelineError::Store(_) => Self::Internal(message),
        }
    }
}
