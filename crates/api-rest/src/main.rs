//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without loading a `.env` file.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `ayunex-run` binary is the
//! deployed entry point.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use ayunex_core::{core_config_from_env_values, PatientService, DATABASE_ENV, TERMINOLOGY_FILE_ENV};

/// Main entry point for the AYUNEX REST API server
///
/// # Environment Variables
/// - `AYUNEX_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `AYUNEX_DATABASE`: SQLite database file (default: "ayunex.db")
/// - `AYUNEX_TERMINOLOGY_FILE`: Optional YAML terminology table
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or database cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("ayunex_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("AYUNEX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(core_config_from_env_values(
        std::env::var(DATABASE_ENV).ok(),
        std::env::var(TERMINOLOGY_FILE_ENV).ok(),
    )?);
    tracing::info!(
        "-- Using database {} with {} terminology entries",
        cfg.database_path().display(),
        cfg.terminology().len()
    );

    let patient_service = PatientService::open(cfg)?;
    let app = router(AppState::new(patient_service));

    tracing::info!("-- Starting AYUNEX REST API on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
