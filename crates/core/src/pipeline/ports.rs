//! Collaborator traits the pipeline is wired with.
//!
//! These traits are implemented by the db and output crates. The data-source,
//! lookup and arbitration ports live with the components that consume them
//! and are re-exported here.

use bytes::Bytes;

use super::error::{OutputError, StoreError};
use super::types::ReportDefinition;
use crate::aggregation::NamedTables;
use crate::template::ColumnMapping;

pub use crate::aggregation::DataSource;
pub use crate::arbitration::{Arbitration, IssueSink};
pub use crate::enrichment::LookupService;

/// Resolves report definitions by name.
pub trait ReportDefinitionStore: Send + Sync {
    /// Finds a report definition. Names compare case-insensitively.
    fn definition(
        &self,
        report_name: &str,
    ) -> impl std::future::Future<Output = Result<Option<ReportDefinition>, StoreError>> + Send;
}

/// Serves report templates.
pub trait TemplateStore: Send + Sync {
    /// Checks whether a template exists for the report.
    fn exists(
        &self,
        report_name: &str,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Fetches the template text of the report.
    fn get(
        &self,
        report_name: &str,
    ) -> impl std::future::Future<Output = Result<String, StoreError>> + Send;
}

/// Serves column display labels.
pub trait ColumnMappingStore: Send + Sync {
    /// Fetches the mapping snapshot for a `;`-joined source list.
    fn mappings(
        &self,
        sources_joined: &str,
    ) -> impl std::future::Future<Output = Result<ColumnMapping, StoreError>> + Send;
}

/// Everything the pipeline reads about a report before running it.
pub trait ReportCatalog: ReportDefinitionStore + TemplateStore + ColumnMappingStore {}

impl<T> ReportCatalog for T where T: ReportDefinitionStore + TemplateStore + ColumnMappingStore {}

/// Produces the final document.
pub trait OutputBackend: Send + Sync {
    /// Converts rendered HTML to PDF.
    fn render_pdf(
        &self,
        html: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<Bytes, OutputError>> + Send;

    /// Writes named tables as a spreadsheet.
    fn render_spreadsheet(
        &self,
        tables: &NamedTables,
        title: &str,
    ) -> impl std::future::Future<Output = Result<Bytes, OutputError>> + Send;
}
