//! Typed errors for the crawl engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! contained per-URL failure apart from a fatal worker failure or a store
//! failure.

use thiserror::Error;

/// Errors that can occur while fetching a single URL.
///
/// These never escape a seed worker: the URL is logged and skipped.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Transport-level failure (DNS, connection reset, TLS, body decode)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with something other than 200
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Fetch did not finish within the per-fetch timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },
}

/// Errors raised by job and content stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No job with this identifier exists
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: String },

    /// A job with this identifier already exists
    #[error("duplicate job: {job_id}")]
    DuplicateJob { job_id: String },

    /// The backing store failed or is unreachable
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Fatal failures of a single seed worker.
///
/// Unlike [`CrawlError`] these abort the worker; the engine still completes
/// the job with whatever the other workers produced.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Seed URL could not be parsed before any fetch happened
    #[error("invalid seed URL {seed}: {source}")]
    InvalidSeed {
        seed: String,
        #[source]
        source: url::ParseError,
    },

    /// The worker task panicked or was aborted
    #[error("worker for seed {seed} did not finish: {message}")]
    Aborted { seed: String, message: String },
}

/// Errors that leave a job incomplete.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Final job update could not be written
    #[error("failed to complete job {job_id}: {source}")]
    Complete {
        job_id: String,
        #[source]
        source: StoreError,
    },

    /// The engine task itself panicked or was cancelled
    #[error("crawl task for job {job_id} did not finish: {message}")]
    Aborted { job_id: String, message: String },
}

/// Result type alias for fetch operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for seed workers.
pub type WorkerResult<T> = std::result::Result<T, WorkerError>;

/// Result type alias for engine runs.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
