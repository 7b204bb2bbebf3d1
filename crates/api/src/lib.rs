//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for report execution
//! - JSON error responses mapped from pipeline errors

pub mod error;
pub mod routes;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use folio_core::aggregation::DataSource;
use folio_core::enrichment::LookupService;
use folio_core::params::ReportRequest;
use folio_core::pipeline::{
    OutputBackend, PipelineError, ReportCatalog, ReportOutcome, ReportPipeline,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Runs report requests on behalf of the HTTP layer.
pub trait ReportExecutor: Send + Sync + 'static {
    /// Runs one report end to end.
    fn execute(
        &self,
        request: ReportRequest,
    ) -> impl Future<Output = Result<ReportOutcome, PipelineError>> + Send;
}

impl<C, D, L, O> ReportExecutor for ReportPipeline<C, D, L, O>
where
    C: ReportCatalog + 'static,
    D: DataSource + 'static,
    L: LookupService + 'static,
    O: OutputBackend + 'static,
{
    fn execute(
        &self,
        request: ReportRequest,
    ) -> impl Future<Output = Result<ReportOutcome, PipelineError>> + Send {
        ReportPipeline::execute(self, request)
    }
}

/// Application state shared across handlers.
pub struct AppState<E> {
    /// Report pipeline.
    pub reports: Arc<E>,
}

impl<E> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            reports: Arc::clone(&self.reports),
        }
    }
}

impl<E> AppState<E> {
    /// Creates state over a report executor.
    pub fn new(reports: Arc<E>) -> Self {
        Self { reports }
    }
}

/// Creates the main application router.
pub fn create_router<E: ReportExecutor>(state: AppState<E>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
