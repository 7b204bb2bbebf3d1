//! API route definitions.

use axum::Router;

use crate::{AppState, ReportExecutor};

pub mod health;
pub mod reports;

/// Creates the API router with all routes.
pub fn api_routes<E: ReportExecutor>() -> Router<AppState<E>> {
    Router::new()
        .merge(health::routes())
        .merge(reports::routes())
}
