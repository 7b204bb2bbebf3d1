//! Report pipeline orchestration.
//!
//! One execution resolves the report definition, enriches parameters,
//! aggregates tables and renders them through the template engine (PDF) or
//! hands them straight to the spreadsheet writer.

mod error;
mod orchestrator;
pub mod ports;
mod types;

#[cfg(test)]
mod tests;

pub use error::{OutputError, PipelineError, StoreError};
pub use orchestrator::ReportPipeline;
pub use ports::{ColumnMappingStore, OutputBackend, ReportCatalog, ReportDefinitionStore, TemplateStore};
pub use types::{MergeMode, OutcomeStatus, PipelineSettings, ReportDefinition, ReportOutcome};
