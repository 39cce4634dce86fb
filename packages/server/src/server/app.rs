//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use crawl_engine::{
    ContentStore, CrawlEngine, HttpFetcher, JobService, JobStore, MemoryStore, SqliteStore,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{create_job_handler, get_job_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobService,
}

impl AppState {
    pub fn new(jobs: JobService) -> Self {
        Self { jobs }
    }
}

/// Wire stores, fetcher and engine together according to `config`.
pub async fn build_job_service(config: &Config) -> Result<JobService> {
    let jobs: Arc<dyn JobStore>;
    let pages: Arc<dyn ContentStore>;

    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store; jobs are lost on restart");
        let store = Arc::new(MemoryStore::new());
        jobs = store.clone();
        pages = store;
    } else {
        let store = Arc::new(
            SqliteStore::new(&config.database_url)
                .await
                .context("Failed to open database")?,
        );
        jobs = store.clone();
        pages = store;
    }

    let crawl_config = config.crawl_config();
    let fetcher = HttpFetcher::new(&crawl_config).context("Failed to build HTTP client")?;

    Ok(JobService::new(CrawlEngine::new(
        Arc::new(fetcher),
        jobs,
        pages,
        crawl_config,
    )))
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/jobs", post(create_job_handler))
        .route("/jobs/:job_id", get(get_job_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
