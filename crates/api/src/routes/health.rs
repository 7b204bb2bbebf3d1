//! Liveness endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;

/// Liveness response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Build version.
    pub version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "folio",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes independent of the report executor.
pub fn routes<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/health", get(health_check))
}
