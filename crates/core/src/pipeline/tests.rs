//! Tests for report orchestration with in-memory collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use folio_shared::config::{
    AppConfig, ArbitrationConfig, DatabaseConfig, RenderingConfig, ServerConfig,
};
use folio_shared::{AppError, ParamType, Severity, Value};
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{Value as Json, json};

use super::*;
use crate::aggregation::{AggregationError, NamedTables, ResultSet, SourceDescriptor};
use crate::arbitration::{ErrorArbiter, codes};
use crate::params::{OutputFormat, ParameterError, ReportRequest};
use crate::template::{ColumnMapping, TemplateError};
use crate::test_support::{InMemorySource, StaticLookup};

#[derive(Default)]
struct InMemoryCatalog {
    definitions: HashMap<String, ReportDefinition>,
    templates: HashMap<String, String>,
    mapping: Option<ColumnMapping>,
}

impl InMemoryCatalog {
    fn with_report(mut self, definition: ReportDefinition, template: Option<&str>) -> Self {
        let key = definition.name.to_lowercase();
        if let Some(template) = template {
            self.templates.insert(key.clone(), template.to_string());
        }
        self.definitions.insert(key, definition);
        self
    }

    fn with_mapping(mut self, mapping: ColumnMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }
}

impl ReportDefinitionStore for InMemoryCatalog {
    async fn definition(&self, report_name: &str) -> Result<Option<ReportDefinition>, StoreError> {
        Ok(self.definitions.get(&report_name.to_lowercase()).cloned())
    }
}

impl TemplateStore for InMemoryCatalog {
    async fn exists(&self, report_name: &str) -> Result<bool, StoreError> {
        Ok(self.templates.contains_key(&report_name.to_lowercase()))
    }

    async fn get(&self, report_name: &str) -> Result<String, StoreError> {
        self.templates
            .get(&report_name.to_lowercase())
            .cloned()
            .ok_or_else(|| StoreError::Unavailable("template vanished".into()))
    }
}

impl ColumnMappingStore for InMemoryCatalog {
    async fn mappings(&self, _sources_joined: &str) -> Result<ColumnMapping, StoreError> {
        self.mapping
            .clone()
            .ok_or_else(|| StoreError::Unavailable("mapping table locked".into()))
    }
}

/// Echoes HTML back as the "PDF" and lists table names for spreadsheets.
#[derive(Default)]
struct EchoOutput {
    titles: Mutex<Vec<String>>,
}

impl OutputBackend for EchoOutput {
    async fn render_pdf(&self, html: &str, title: &str) -> Result<Bytes, OutputError> {
        self.titles.lock().unwrap().push(title.to_string());
        Ok(Bytes::from(html.to_string()))
    }

    async fn render_spreadsheet(&self, tables: &NamedTables, title: &str) -> Result<Bytes, OutputError> {
        self.titles.lock().unwrap().push(title.to_string());
        let listing: Vec<String> = tables
            .iter()
            .map(|(name, table)| format!("{name}:{}", table.len()))
            .collect();
        Ok(Bytes::from(listing.join(",")))
    }
}

type TestPipeline = ReportPipeline<InMemoryCatalog, InMemorySource, StaticLookup, EchoOutput>;

const TEMPLATE: &str = concat!(
    "<h1>{{@title}}</h1><p>{{param:OrganizationName}} / {{param:Total}}</p>",
    "<table><tr><th>{{header:account}}</th><th>{{header:arrears_amount}}</th></tr>",
    r#"<tr data-table-row="arrears"><td>{{account}}</td><td>{{amount}}</td></tr></table>"#,
    "{{if hesder == -1}}<p>summary</p>{{endif}}"
);

fn arrears_definition(merge_mode: MergeMode) -> ReportDefinition {
    ReportDefinition {
        name: "Arrears".into(),
        title: "Arrears by account".into(),
        sources: SourceDescriptor::parse("rpt_arrears;rpt_penalties").unwrap(),
        merge_mode,
        dataset: "arrears".into(),
    }
}

fn source() -> InMemorySource {
    InMemorySource::new()
        .with_results(
            "rpt_arrears",
            vec![ResultSet::with_columns(
                &["account", "amount"],
                vec![vec![Value::Text("A-1".into()), Value::Decimal(dec!(1500))]],
            )],
        )
        .with_results(
            "rpt_penalties",
            vec![ResultSet::with_columns(
                &["account", "penalty"],
                vec![vec![Value::Text("A-2".into()), Value::Decimal(dec!(12.5))]],
            )],
        )
}

fn mapping() -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    mapping.insert("account", "Account");
    mapping.insert_scoped("arrears", "amount", "Amount owed");
    mapping
}

fn pipeline_with(
    catalog: InMemoryCatalog,
    source: InMemorySource,
    arbitration: ArbitrationConfig,
) -> (TestPipeline, Arc<InMemorySource>, Arc<ErrorArbiter>) {
    let source = Arc::new(source);
    let arbiter = Arc::new(ErrorArbiter::new(arbitration));
    let pipeline = ReportPipeline::new(
        Arc::new(catalog),
        Arc::clone(&source),
        Arc::new(StaticLookup::default()),
        Arc::new(EchoOutput::default()),
        arbiter.clone(),
        PipelineSettings::default(),
    );
    (pipeline, source, arbiter)
}

fn request(format: OutputFormat) -> ReportRequest {
    ReportRequest::builder("arrears")
        .job_number(11)
        .format(format)
        .param("Total", dec!(1234.5), ParamType::Decimal)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_pdf_report_end_to_end() {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some(TEMPLATE))
        .with_mapping(mapping());
    let (pipeline, source, arbiter) = pipeline_with(catalog, source(), ArbitrationConfig::default());

    let outcome = pipeline.execute(request(OutputFormat::Pdf)).await.unwrap();

    let html = String::from_utf8(outcome.payload.to_vec()).unwrap();
    assert_eq!(
        html,
        concat!(
            "<h1>Arrears by account</h1><p>Riverside Council / 1,234.50</p>",
            "<table><tr><th>Account</th><th>Amount owed</th></tr>",
            "<tr><td>A-1</td><td>1,500.00</td></tr>",
            "<tr><td>A-2</td><td></td></tr></table>",
            "<p>summary</p>"
        )
    );
    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(outcome.content_type(), "application/pdf");
    assert!(outcome.issues.is_empty());
    assert_eq!(source.calls(), ["rpt_arrears", "rpt_penalties"]);

    let snapshot = arbiter.snapshot();
    assert_eq!(
        snapshot.last_of(Severity::Information).map(|i| i.code),
        Some(codes::REPORT_COMPLETED)
    );
}

#[tokio::test]
async fn test_enriched_parameters_feed_data_sources() {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some(TEMPLATE))
        .with_mapping(mapping());
    let (pipeline, source, _) = pipeline_with(catalog, source(), ArbitrationConfig::default());

    pipeline.execute(request(OutputFormat::Pdf)).await.unwrap();

    let seen = source.seen_params();
    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0].value("OrganizationName"),
        Some(&Value::Text("Riverside Council".into()))
    );
    assert_eq!(seen[1].value("total"), Some(&Value::Decimal(dec!(1234.5))));
}

#[tokio::test]
async fn test_triples_are_normalized_during_enrichment() {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some(TEMPLATE))
        .with_mapping(mapping());
    let (pipeline, source, _) = pipeline_with(catalog, source(), ArbitrationConfig::default());

    let request = ReportRequest::from_triples(
        "arrears",
        OutputFormat::Pdf,
        Some(11),
        vec![json!("@Month"), json!("3"), json!("Int32")],
    );
    let outcome = pipeline.execute(request).await.unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    let seen = source.seen_params();
    assert_eq!(seen[0].value("month"), Some(&Value::Int32(3)));
    assert!(seen[0].contains("MonthName"));
}

#[rstest]
#[case(vec![json!("Month"), json!(3)])]
#[case(vec![json!("Month"), json!(3), json!("Int32"), json!("month"), json!(4), json!("Int32")])]
#[case(vec![json!("Month"), json!("March"), json!("Int32")])]
#[tokio::test]
async fn test_malformed_triples_are_reported_through_arbitration(#[case] raw: Vec<Json>) {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some(TEMPLATE))
        .with_mapping(mapping());
    let (pipeline, source, arbiter) = pipeline_with(catalog, source(), ArbitrationConfig::default());

    let request = ReportRequest::from_triples("arrears", OutputFormat::Pdf, Some(11), raw);
    let err = pipeline.execute(request).await.unwrap_err();

    assert!(matches!(err, PipelineError::Parameters(_)));
    assert!(source.calls().is_empty());
    let fatal = arbiter.snapshot().last_of(Severity::Error).cloned().unwrap();
    assert_eq!(fatal.code, "INVALID_PARAMETERS");
    assert_eq!(fatal.report_name.as_deref(), Some("arrears"));
    assert_eq!(fatal.job_number, Some(11));
}

#[tokio::test]
async fn test_blank_report_name_is_reported_through_arbitration() {
    let (pipeline, _, arbiter) =
        pipeline_with(InMemoryCatalog::default(), source(), ArbitrationConfig::default());

    let request = ReportRequest::from_triples("  ", OutputFormat::Pdf, None, Vec::new());
    let err = pipeline.execute(request).await.unwrap_err();

    assert!(matches!(err, PipelineError::Parameters(ParameterError::EmptyReportName)));
    assert_eq!(
        arbiter.snapshot().last_of(Severity::Error).map(|i| i.code),
        Some("INVALID_PARAMETERS")
    );
}

#[tokio::test]
async fn test_spreadsheet_per_source_needs_no_template() {
    let catalog = InMemoryCatalog::default().with_report(arrears_definition(MergeMode::PerSource), None);
    let (pipeline, _, _) = pipeline_with(catalog, source(), ArbitrationConfig::default());

    let outcome = pipeline
        .execute(request(OutputFormat::Spreadsheet))
        .await
        .unwrap();

    assert_eq!(&outcome.payload[..], b"rpt_arrears:1,rpt_penalties:1");
    assert_eq!(outcome.format, OutputFormat::Spreadsheet);
}

#[tokio::test]
async fn test_unknown_report_is_not_found() {
    let (pipeline, source, arbiter) =
        pipeline_with(InMemoryCatalog::default(), source(), ArbitrationConfig::default());

    let err = pipeline.execute(request(OutputFormat::Pdf)).await.unwrap_err();

    assert!(matches!(err, PipelineError::ReportNotFound(ref name) if name == "arrears"));
    assert!(source.calls().is_empty());
    assert_eq!(
        arbiter.snapshot().last_of(Severity::Error).map(|i| i.code),
        Some("REPORT_NOT_FOUND")
    );
}

#[tokio::test]
async fn test_missing_template_is_distinct_from_render_failure() {
    let catalog = InMemoryCatalog::default().with_report(arrears_definition(MergeMode::Union), None);
    let (pipeline, _, _) = pipeline_with(catalog, source(), ArbitrationConfig::default());

    let err = pipeline.execute(request(OutputFormat::Pdf)).await.unwrap_err();

    assert!(matches!(err, PipelineError::TemplateNotFound(_)));
    assert_eq!(err.error_code(), "TEMPLATE_NOT_FOUND");
}

#[tokio::test]
async fn test_empty_template_fails_the_report() {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some("  "))
        .with_mapping(mapping());
    let (pipeline, _, _) = pipeline_with(catalog, source(), ArbitrationConfig::default());

    let err = pipeline.execute(request(OutputFormat::Pdf)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Template(TemplateError::InvalidTemplate)));
}

#[tokio::test]
async fn test_source_failure_aborts_report() {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some(TEMPLATE))
        .with_mapping(mapping());
    let (pipeline, _, arbiter) =
        pipeline_with(catalog, source().failing("rpt_penalties"), ArbitrationConfig::default());

    let err = pipeline.execute(request(OutputFormat::Pdf)).await.unwrap_err();

    match &err {
        PipelineError::Aggregation(AggregationError::SourceFailed { source_name, .. }) => {
            assert_eq!(source_name, "rpt_penalties");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let fatal = arbiter.snapshot().last_of(Severity::Error).cloned().unwrap();
    assert_eq!(fatal.code, "DATA_SOURCE_FAILED");
    assert_eq!(fatal.job_number, Some(11));
    assert!(fatal.cause.unwrap().contains("rpt_penalties exploded"));
}

#[tokio::test]
async fn test_missing_mapping_degrades_to_raw_headers() {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some(TEMPLATE));
    let (pipeline, _, _) = pipeline_with(catalog, source(), ArbitrationConfig::default());

    let outcome = pipeline.execute(request(OutputFormat::Pdf)).await.unwrap();

    let html = String::from_utf8(outcome.payload.to_vec()).unwrap();
    assert!(html.contains("<th>account</th><th>arrears_amount</th>"));
    assert_eq!(outcome.status, OutcomeStatus::SucceededWithIssues);
    let issue_codes: Vec<_> = outcome.issues.iter().map(|i| i.code).collect();
    assert_eq!(issue_codes, [codes::COLUMN_MAPPING_UNAVAILABLE]);
}

#[tokio::test]
async fn test_breaking_warning_halts_report() {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some(TEMPLATE));
    let (pipeline, _, _) = pipeline_with(
        catalog,
        source(),
        ArbitrationConfig {
            log_threshold: Severity::Warning,
            break_threshold: Severity::Warning,
        },
    );

    let err = pipeline.execute(request(OutputFormat::Pdf)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Halted { stage: "column_mapping" }));
}

#[tokio::test]
async fn test_concurrent_executions_are_independent() {
    let catalog = InMemoryCatalog::default()
        .with_report(arrears_definition(MergeMode::Union), Some(TEMPLATE))
        .with_mapping(mapping());
    let (pipeline, source, arbiter) = pipeline_with(catalog, source(), ArbitrationConfig::default());
    let pipeline = Arc::new(pipeline);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move { pipeline.execute(request(OutputFormat::Pdf)).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(source.calls().len(), 8);
    assert_eq!(arbiter.snapshot().total, 4);
}

#[rstest]
#[case(PipelineError::ReportNotFound("r".into()), 404)]
#[case(PipelineError::TemplateNotFound("r".into()), 404)]
#[case(PipelineError::Parameters(ParameterError::EmptyReportName), 400)]
#[case(PipelineError::Aggregation(AggregationError::NoSources), 502)]
#[case(PipelineError::Output(OutputError::Timeout { secs: 5 }), 502)]
#[case(PipelineError::Halted { stage: "gap_fill" }, 422)]
#[case(PipelineError::Template(TemplateError::InvalidTemplate), 500)]
#[case(PipelineError::Store(StoreError::Unavailable("down".into())), 500)]
fn test_pipeline_errors_map_to_http_status(#[case] error: PipelineError, #[case] status: u16) {
    assert_eq!(AppError::from(error).status_code(), status);
}

#[test]
fn test_settings_reject_unknown_time_zone() {
    let config = AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/folio".into(),
            max_connections: 1,
            min_connections: 1,
            query_timeout_secs: 5,
        },
        arbitration: ArbitrationConfig::default(),
        enrichment: folio_shared::config::EnrichmentConfig::default(),
        rendering: RenderingConfig {
            time_zone: "Mars/Olympus".into(),
            ..RenderingConfig::default()
        },
    };
    assert!(matches!(
        PipelineSettings::from_config(&config),
        Err(PipelineError::InvalidConfiguration(_))
    ));

    let valid = AppConfig {
        rendering: RenderingConfig {
            time_zone: "Africa/Johannesburg".into(),
            ..RenderingConfig::default()
        },
        ..config
    };
    let settings = PipelineSettings::from_config(&valid).unwrap();
    assert_eq!(settings.time_zone, chrono_tz::Africa::Johannesburg);
}
