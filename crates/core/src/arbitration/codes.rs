//! Stable issue codes for non-fatal conditions.
//!
//! Fatal pipeline failures use [`PipelineError::error_code`](crate::pipeline::PipelineError::error_code).

/// Declared parameters of the primary source could not be fetched.
pub const DECLARED_PARAMETERS_UNAVAILABLE: &str = "DECLARED_PARAMETERS_UNAVAILABLE";

/// A declared parameter has a type name that cannot be classified.
pub const UNKNOWN_DECLARED_TYPE: &str = "UNKNOWN_DECLARED_TYPE";

/// A secondary parameter could not be derived.
pub const DERIVATION_FAILED: &str = "DERIVATION_FAILED";

/// A header label token had an empty column reference.
pub const EMPTY_HEADER_REFERENCE: &str = "EMPTY_HEADER_REFERENCE";

/// A template phase failed and was skipped.
pub const TEMPLATE_PHASE_SKIPPED: &str = "TEMPLATE_PHASE_SKIPPED";

/// The column mapping snapshot could not be fetched.
pub const COLUMN_MAPPING_UNAVAILABLE: &str = "COLUMN_MAPPING_UNAVAILABLE";

/// Timing of a completed report.
pub const REPORT_COMPLETED: &str = "REPORT_COMPLETED";
