//! HTML-to-PDF rendering service client.

use std::time::Duration;

use bytes::Bytes;
use folio_core::pipeline::OutputError;
use folio_shared::config::RenderingConfig;
use reqwest::Client;
use serde::Serialize;

/// Longest error body kept in [`OutputError::Status`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
    title: &'a str,
}

/// Posts rendered HTML to the PDF service and returns the document bytes.
///
/// The service receives `{"html": ..., "title": ...}` as JSON and answers
/// with the PDF body.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl PdfRenderer {
    /// Creates a renderer for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Request`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, OutputError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OutputError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout_secs,
        })
    }

    /// Creates a renderer from rendering settings.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Request`] if the HTTP client cannot be built.
    pub fn from_config(config: &RenderingConfig) -> Result<Self, OutputError> {
        Self::new(config.pdf_service_url.clone(), config.pdf_timeout_secs)
    }

    /// Renders HTML to PDF.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Timeout`] if the service does not answer in
    /// time, [`OutputError::Status`] for a non-success status and
    /// [`OutputError::Encoding`] for an empty document.
    pub async fn render(&self, html: &str, title: &str) -> Result<Bytes, OutputError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RenderRequest { html, title })
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            tracing::warn!(status = status.as_u16(), "PDF service rejected document");
            return Err(OutputError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let document = response.bytes().await.map_err(|e| self.request_error(&e))?;
        if document.is_empty() {
            return Err(OutputError::Encoding("PDF service returned an empty document".into()));
        }

        tracing::debug!(bytes = document.len(), "PDF rendered");
        Ok(document)
    }

    fn request_error(&self, error: &reqwest::Error) -> OutputError {
        if error.is_timeout() {
            OutputError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            OutputError::Request(error.to_string())
        }
    }
}
