//! Report routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use folio_core::params::{OutputFormat, ReportRequest};
use serde::Deserialize;

use crate::error::ApiError;
use crate::{AppState, ReportExecutor};

/// Number of non-fatal issues raised while producing the document.
pub const ISSUES_HEADER: &str = "x-folio-issues";

/// Identifier of the report execution.
pub const RUN_ID_HEADER: &str = "x-folio-run-id";

/// Request body of the report endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct RunReportBody {
    /// Caller's job number.
    #[serde(default)]
    pub job_number: Option<i64>,
    /// Flat `name, value, type` list.
    #[serde(default)]
    pub parameters: Vec<serde_json::Value>,
}

/// Creates the report routes.
pub fn routes<E: ReportExecutor>() -> Router<AppState<E>> {
    Router::new()
        .route("/reports/{name}/pdf", post(run_pdf::<E>))
        .route("/reports/{name}/spreadsheet", post(run_spreadsheet::<E>))
}

/// POST /reports/{name}/pdf
async fn run_pdf<E: ReportExecutor>(
    State(state): State<AppState<E>>,
    Path(name): Path<String>,
    Json(body): Json<RunReportBody>,
) -> Result<Response, ApiError> {
    run(&state, name, OutputFormat::Pdf, body).await
}

/// POST /reports/{name}/spreadsheet
async fn run_spreadsheet<E: ReportExecutor>(
    State(state): State<AppState<E>>,
    Path(name): Path<String>,
    Json(body): Json<RunReportBody>,
) -> Result<Response, ApiError> {
    run(&state, name, OutputFormat::Spreadsheet, body).await
}

async fn run<E: ReportExecutor>(
    state: &AppState<E>,
    name: String,
    format: OutputFormat,
    body: RunReportBody,
) -> Result<Response, ApiError> {
    let request = ReportRequest::from_triples(name, format, body.job_number, body.parameters);
    let outcome = state.reports.execute(request).await?;

    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        file_stem(&outcome.report_name),
        outcome.format.extension()
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, outcome.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (
                HeaderName::from_static(ISSUES_HEADER),
                outcome.issues.len().to_string(),
            ),
            (
                HeaderName::from_static(RUN_ID_HEADER),
                outcome.run_id.to_string(),
            ),
        ],
        outcome.payload,
    )
        .into_response())
}

fn file_stem(report_name: &str) -> String {
    report_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use bytes::Bytes;
    use folio_core::aggregation::AggregationError;
    use folio_core::arbitration::Issue;
    use folio_core::params::{SuppliedParameters, normalize_triples};
    use folio_core::pipeline::{OutcomeStatus, PipelineError, ReportOutcome};
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::{Value as Json, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::create_router;

    /// Answers by report name and records every request.
    #[derive(Default)]
    struct StubExecutor {
        requests: Mutex<Vec<ReportRequest>>,
    }

    impl ReportExecutor for StubExecutor {
        async fn execute(&self, request: ReportRequest) -> Result<ReportOutcome, PipelineError> {
            self.requests.lock().unwrap().push(request.clone());
            if let SuppliedParameters::Triples(raw) = &request.parameters {
                normalize_triples(raw)?;
            }
            match request.report_name.as_str() {
                "missing" => Err(PipelineError::ReportNotFound("missing".into())),
                "no_template" => Err(PipelineError::TemplateNotFound("no_template".into())),
                "broken" => Err(PipelineError::Aggregation(AggregationError::NoSources)),
                "halted" => Err(PipelineError::Halted { stage: "gap_fill" }),
                name => Ok(ReportOutcome {
                    run_id: Uuid::nil(),
                    report_name: name.to_string(),
                    format: request.format,
                    payload: Bytes::from_static(b"%PDF-1.7"),
                    status: OutcomeStatus::SucceededWithIssues,
                    issues: vec![Issue::warning("DERIVATION_FAILED", "Month lookup failed")],
                    elapsed: Duration::from_millis(12),
                }),
            }
        }
    }

    fn post_json(uri: &str, body: &Json) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Json {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_pdf_report_returns_document_and_issue_count() {
        let executor = Arc::new(StubExecutor::default());
        let app = create_router(AppState::new(Arc::clone(&executor)));

        let response = app
            .oneshot(post_json(
                "/api/v1/reports/Arrears%20Q1/pdf",
                &json!({ "job_number": 11, "parameters": ["@Month", "3", "Int32"] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(headers[ISSUES_HEADER], "1");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Arrears_Q1.pdf\""
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"%PDF-1.7");

        let requests = executor.requests.lock().unwrap();
        assert_eq!(requests[0].report_name, "Arrears Q1");
        assert_eq!(requests[0].job_number, Some(11));
        assert_eq!(
            requests[0].parameters,
            SuppliedParameters::Triples(vec![json!("@Month"), json!("3"), json!("Int32")])
        );
    }

    #[tokio::test]
    async fn test_spreadsheet_route_selects_format() {
        let executor = Arc::new(StubExecutor::default());
        let app = create_router(AppState::new(Arc::clone(&executor)));

        let response = app
            .oneshot(post_json("/api/v1/reports/arrears/spreadsheet", &json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            OutputFormat::Spreadsheet.content_type()
        );
        assert_eq!(
            executor.requests.lock().unwrap()[0].format,
            OutputFormat::Spreadsheet
        );
    }

    #[rstest]
    #[case("missing", StatusCode::NOT_FOUND, "REPORT_NOT_FOUND")]
    #[case("no_template", StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND")]
    #[case("broken", StatusCode::BAD_GATEWAY, "DATA_SOURCE_FAILED")]
    #[case("halted", StatusCode::UNPROCESSABLE_ENTITY, "REPORT_HALTED")]
    #[tokio::test]
    async fn test_pipeline_errors_become_json(
        #[case] report: &str,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let app = create_router(AppState::new(Arc::new(StubExecutor::default())));

        let response = app
            .oneshot(post_json(&format!("/api/v1/reports/{report}/pdf"), &json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), status);
        let body = body_json(response).await;
        assert_eq!(body["error"], code);
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_parameters_reach_the_executor_and_map_to_400() {
        let executor = Arc::new(StubExecutor::default());
        let app = create_router(AppState::new(Arc::clone(&executor)));

        let response = app
            .oneshot(post_json(
                "/api/v1/reports/arrears/pdf",
                &json!({ "parameters": ["Month", 3] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "INVALID_PARAMETERS");
        assert_eq!(executor.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(AppState::new(Arc::new(StubExecutor::default())));

        let response = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "folio");
    }

    #[rstest]
    #[case("arrears", "arrears")]
    #[case(" Arrears Q1 ", "Arrears_Q1")]
    #[case("../etc/passwd", "___etc_passwd")]
    fn test_file_stem(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(file_stem(name), expected);
    }
}
