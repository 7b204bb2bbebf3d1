//! Report pipeline orchestration.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::{NaiveDateTime, Utc};
use folio_shared::Severity;
use tracing::Instrument;
use uuid::Uuid;

use super::error::PipelineError;
use super::ports::{OutputBackend, ReportCatalog};
use super::types::{MergeMode, OutcomeStatus, PipelineSettings, ReportDefinition, ReportOutcome};
use crate::aggregation::{DataSource, NamedTables, TabularAggregator};
use crate::arbitration::{Arbitration, Diagnostics, Issue, codes};
use crate::enrichment::{EnrichmentEngine, LookupService};
use crate::params::{OutputFormat, ParameterError, ParameterMap, ReportRequest, SuppliedParameters};
use crate::template::{ColumnMapping, TemplateEngine};

const MODULE: &str = "pipeline";

/// Assembles reports.
///
/// Executions are independent of each other and may run concurrently; the
/// only state they share is inside the arbitration collaborator.
pub struct ReportPipeline<C, D, L, O>
where
    C: ReportCatalog,
    D: DataSource,
    L: LookupService,
    O: OutputBackend,
{
    catalog: Arc<C>,
    data_source: Arc<D>,
    lookup: Arc<L>,
    output: Arc<O>,
    arbiter: Arc<dyn Arbitration>,
    settings: PipelineSettings,
}

impl<C, D, L, O> ReportPipeline<C, D, L, O>
where
    C: ReportCatalog,
    D: DataSource,
    L: LookupService,
    O: OutputBackend,
{
    /// Creates a pipeline over its collaborators.
    #[must_use]
    pub fn new(
        catalog: Arc<C>,
        data_source: Arc<D>,
        lookup: Arc<L>,
        output: Arc<O>,
        arbiter: Arc<dyn Arbitration>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            catalog,
            data_source,
            lookup,
            output,
            arbiter,
            settings,
        }
    }

    /// Runs one report end to end.
    ///
    /// Fatal errors are reported through arbitration with Error severity
    /// before being returned.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if the report cannot be produced.
    pub async fn execute(&self, request: ReportRequest) -> Result<ReportOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "report",
            name = %request.report_name,
            %run_id,
            format = %request.format,
        );
        self.run(run_id, request).instrument(span).await
    }

    async fn run(
        &self,
        run_id: Uuid,
        request: ReportRequest,
    ) -> Result<ReportOutcome, PipelineError> {
        let started = Instant::now();
        let ReportRequest {
            report_name,
            job_number,
            format,
            parameters,
        } = request;
        let mut diag = Diagnostics::new(self.arbiter.as_ref(), report_name.as_str(), job_number);

        let result = self
            .assemble(&report_name, format, parameters, &mut diag)
            .await;
        let elapsed = started.elapsed();

        match result {
            Ok(payload) => {
                diag.report(
                    Issue::new(
                        codes::REPORT_COMPLETED,
                        Severity::Information,
                        format!(
                            "Report {report_name} assembled in {} ms ({} bytes)",
                            elapsed.as_millis(),
                            payload.len()
                        ),
                    )
                    .at(MODULE, "execute"),
                );
                let issues = diag.into_issues();
                let status = if issues.is_empty() {
                    OutcomeStatus::Succeeded
                } else {
                    OutcomeStatus::SucceededWithIssues
                };
                tracing::info!(
                    issues = issues.len(),
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "Report assembled"
                );

                Ok(ReportOutcome {
                    run_id,
                    report_name,
                    format,
                    payload,
                    status,
                    issues,
                    elapsed,
                })
            }
            Err(error) => {
                diag.report(
                    Issue::new(error.error_code(), Severity::Error, error.to_string())
                        .at(MODULE, "execute")
                        .caused_by(&error),
                );
                Err(error)
            }
        }
    }

    async fn assemble(
        &self,
        report_name: &str,
        format: OutputFormat,
        parameters: SuppliedParameters,
        diag: &mut Diagnostics<'_>,
    ) -> Result<Bytes, PipelineError> {
        if report_name.trim().is_empty() {
            return Err(ParameterError::EmptyReportName.into());
        }
        let definition = self
            .catalog
            .definition(report_name)
            .await?
            .ok_or_else(|| PipelineError::ReportNotFound(report_name.to_string()))?;
        let title = if definition.title.trim().is_empty() {
            definition.name.as_str()
        } else {
            definition.title.as_str()
        };

        let enrichment = EnrichmentEngine::new(
            self.data_source.as_ref(),
            self.lookup.as_ref(),
            &self.settings.enrichment,
        );
        let primary = definition.sources.primary();
        let params = match parameters {
            SuppliedParameters::Map(map) => {
                enrichment.enrich_map(report_name, primary, map, diag).await?
            }
            SuppliedParameters::Triples(raw) => {
                enrichment.enrich(report_name, primary, &raw, diag).await?
            }
        };

        let tables = self.aggregate(&definition, &params).await?;

        match format {
            OutputFormat::Pdf => {
                if !self.catalog.exists(report_name).await? {
                    return Err(PipelineError::TemplateNotFound(report_name.to_string()));
                }
                let template = self.catalog.get(report_name).await?;
                let mapping = self.column_mapping(&definition, diag).await?;

                let engine = TemplateEngine::new(mapping, self.now())
                    .with_labels(self.settings.labels.clone());
                let html = engine.render(&template, title, &params, &tables, diag)?;
                Ok(self.output.render_pdf(&html, title).await?)
            }
            OutputFormat::Spreadsheet => Ok(self.output.render_spreadsheet(&tables, title).await?),
        }
    }

    async fn aggregate(
        &self,
        definition: &ReportDefinition,
        params: &ParameterMap,
    ) -> Result<NamedTables, PipelineError> {
        let aggregator = TabularAggregator::new(self.data_source.as_ref());
        let sources = definition.sources.names();
        let tables = match definition.merge_mode {
            MergeMode::Union => {
                let table = aggregator.aggregate_union(sources, params).await?;
                NamedTables::single(definition.dataset.as_str(), table)
            }
            MergeMode::PerSource => aggregator.aggregate_per_source(sources, params).await?,
        };
        Ok(tables)
    }

    /// Fetches column labels; a failure degrades to an empty mapping.
    async fn column_mapping(
        &self,
        definition: &ReportDefinition,
        diag: &mut Diagnostics<'_>,
    ) -> Result<ColumnMapping, PipelineError> {
        match self.catalog.mappings(&definition.sources.joined()).await {
            Ok(mapping) => Ok(mapping),
            Err(e) => {
                let can_continue = diag.warn(
                    codes::COLUMN_MAPPING_UNAVAILABLE,
                    (MODULE, "column_mapping"),
                    "Column mapping unavailable, using raw column names",
                    Some(&e),
                );
                if can_continue {
                    Ok(ColumnMapping::new())
                } else {
                    Err(PipelineError::Halted {
                        stage: "column_mapping",
                    })
                }
            }
        }
    }

    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.settings.time_zone).naive_local()
    }
}
