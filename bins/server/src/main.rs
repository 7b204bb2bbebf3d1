//! Folio API Server
//!
//! Main entry point for the Folio report service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::{AppState, create_router};
use folio_core::arbitration::ErrorArbiter;
use folio_core::pipeline::{PipelineSettings, ReportPipeline};
use folio_db::{
    DbIssueSink, LookupRepository, ProcedureDataSource, ReportRepository, connect_with,
};
use folio_output::DocumentBackend;
use folio_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");
    let settings = PipelineSettings::from_config(&config)?;

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    // Issues above the log threshold are written in the background
    let (sink, issue_writer) = DbIssueSink::spawn(db.clone());
    let arbiter = ErrorArbiter::with_sink(config.arbitration, Arc::new(sink));
    info!(
        log_threshold = %config.arbitration.log_threshold,
        break_threshold = %config.arbitration.break_threshold,
        "Error arbitration configured"
    );

    let output = DocumentBackend::from_config(&config.rendering)?;
    info!(
        pdf_service = %config.rendering.pdf_service_url,
        time_zone = %settings.time_zone,
        "Output backends configured"
    );

    let pipeline = ReportPipeline::new(
        Arc::new(ReportRepository::new(
            db.clone(),
            config.rendering.cache_ttl_secs,
        )),
        Arc::new(ProcedureDataSource::from_connection(
            &db,
            config.database.query_timeout_secs,
        )),
        Arc::new(LookupRepository::new(db)),
        Arc::new(output),
        Arc::new(arbiter),
        settings,
    );

    // Create router
    let app = create_router(AppState::new(Arc::new(pipeline)));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    // The router owned the last sink handle; let the writer drain.
    issue_writer.await?;

    Ok(())
}
