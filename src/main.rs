use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use ayunex_core::{core_config_from_env_values, PatientService, DATABASE_ENV, TERMINOLOGY_FILE_ENV};

/// Main entry point for the AYUNEX application
///
/// Loads `.env` if present, resolves configuration once, opens the record database and serves
/// the REST API until the process is stopped with Ctrl-C.
///
/// # Environment Variables
/// - `AYUNEX_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `AYUNEX_DATABASE`: SQLite database file (default: "ayunex.db")
/// - `AYUNEX_TERMINOLOGY_FILE`: Optional YAML terminology table replacing the built-in one
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, startup or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ayunex_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("ayunex_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("AYUNEX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(core_config_from_env_values(
        std::env::var(DATABASE_ENV).ok(),
        std::env::var(TERMINOLOGY_FILE_ENV).ok(),
    )?);
    tracing::info!(
        "++ Using database {} with {} terminology entries",
        cfg.database_path().display(),
        cfg.terminology().len()
    );

    let patient_service = PatientService::open(cfg)?;
    let rest_app = router(AppState::new(patient_service));

    tracing::info!("++ Starting AYUNEX REST on {}", rest_addr);
    let listener = TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, rest_app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("++ AYUNEX stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
