//! Pipeline types.

use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use chrono_tz::Tz;
use folio_shared::AppConfig;
use folio_shared::config::EnrichmentConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PipelineError;
use crate::aggregation::SourceDescriptor;
use crate::arbitration::Issue;
use crate::params::OutputFormat;
use crate::template::RenderLabels;

/// How the results of several sources are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// One table, named after the definition's dataset.
    #[default]
    Union,
    /// One table per source, named after the source.
    PerSource,
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "union" => Ok(Self::Union),
            "per_source" | "per-source" => Ok(Self::PerSource),
            _ => Err(format!("Unknown merge mode: {s}")),
        }
    }
}

/// Stored configuration of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDefinition {
    /// Unique report name.
    pub name: String,
    /// Title substituted into the template and passed to the backend.
    pub title: String,
    /// Data sources, invoked in order.
    pub sources: SourceDescriptor,
    /// How source results are combined.
    pub merge_mode: MergeMode,
    /// Table name of the union result.
    pub dataset: String,
}

/// Whether the report completed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// No warnings were raised.
    Succeeded,
    /// The report was produced, but warnings were raised.
    SucceededWithIssues,
}

/// Result of a successful report execution.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// Identifier of this execution.
    pub run_id: Uuid,
    /// Report that was produced.
    pub report_name: String,
    /// Output format of the payload.
    pub format: OutputFormat,
    /// Document bytes.
    pub payload: Bytes,
    /// Completion status.
    pub status: OutcomeStatus,
    /// Non-fatal issues raised along the way.
    pub issues: Vec<Issue>,
    /// Wall-clock duration of the execution.
    pub elapsed: Duration,
}

impl ReportOutcome {
    /// MIME type of the payload.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Settings fixed at pipeline construction.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Time zone of the current date/time tokens.
    pub time_zone: Tz,
    /// Placeholder row texts.
    pub labels: RenderLabels,
    /// Parameter names and labels used by enrichment.
    pub enrichment: EnrichmentConfig,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            time_zone: Tz::UTC,
            labels: RenderLabels::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl PipelineSettings {
    /// Builds settings from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfiguration`] for an unknown time zone.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let time_zone = config.rendering.time_zone.parse::<Tz>().map_err(|e| {
            PipelineError::InvalidConfiguration(format!(
                "rendering.time_zone {}: {e}",
                config.rendering.time_zone
            ))
        })?;

        Ok(Self {
            time_zone,
            labels: RenderLabels::from(&config.rendering),
            enrichment: config.enrichment.clone(),
        })
    }
}
