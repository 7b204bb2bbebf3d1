//! Document backends for Folio.
//!
//! This crate provides:
//! - [`PdfRenderer`] - client for the HTML-to-PDF rendering service
//! - [`SpreadsheetWriter`] - CSV writer for aggregated tables
//! - [`DocumentBackend`] - both combined behind the pipeline's output port

mod pdf;
mod spreadsheet;

pub use pdf::PdfRenderer;
pub use spreadsheet::SpreadsheetWriter;

use bytes::Bytes;
use folio_core::aggregation::NamedTables;
use folio_core::pipeline::{OutputBackend, OutputError};
use folio_shared::config::RenderingConfig;

/// Output backend used by the server.
#[derive(Debug, Clone)]
pub struct DocumentBackend {
    pdf: PdfRenderer,
}

impl DocumentBackend {
    /// Creates a backend over a PDF renderer.
    #[must_use]
    pub const fn new(pdf: PdfRenderer) -> Self {
        Self { pdf }
    }

    /// Creates a backend from rendering settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &RenderingConfig) -> Result<Self, OutputError> {
        Ok(Self::new(PdfRenderer::from_config(config)?))
    }
}

impl OutputBackend for DocumentBackend {
    async fn render_pdf(&self, html: &str, title: &str) -> Result<Bytes, OutputError> {
        self.pdf.render(html, title).await
    }

    async fn render_spreadsheet(
        &self,
        tables: &NamedTables,
        title: &str,
    ) -> Result<Bytes, OutputError> {
        SpreadsheetWriter::write(tables, title)
    }
}
