// Main entry point for the crawl API server

use anyhow::{Context, Result};
use server_core::{
    server::{build_app, build_job_service, AppState},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,crawl_engine=debug,server_core=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Shoppin' crawl API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(database_url = %config.database_url, "Configuration loaded");

    let jobs = build_job_service(&config).await?;
    let app = build_app(AppState::new(jobs));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
