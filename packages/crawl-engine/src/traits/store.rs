//! Storage traits for jobs and fetched pages.
//!
//! Split into two focused traits:
//! - `JobStore`: job metadata plus its visited/product collections
//! - `ContentStore`: append-only raw page content per (job, URL)
//!
//! Both are shared by every running job and every seed worker, so
//! implementations must be safe under concurrent use.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{CrawledPage, Job};

/// Persistence of job records, keyed by job identifier.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job.
    ///
    /// Fails with `StoreError::DuplicateJob` if the identifier is taken.
    async fn create(&self, job: &Job) -> StoreResult<()>;

    /// Replace the visited/product collections and set `completed`.
    ///
    /// The replacement is atomic: readers see either the old or the new
    /// record, never a mix. Fails with `StoreError::JobNotFound` for an
    /// unknown identifier.
    async fn update(
        &self,
        job_id: &str,
        completed: bool,
        visited_urls: &[String],
        product_urls: &[String],
    ) -> StoreResult<()>;

    /// Current snapshot of a job, or `StoreError::JobNotFound`.
    async fn get(&self, job_id: &str) -> StoreResult<Job>;
}

/// Append-only persistence of fetched page content.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Append a page row. Duplicate (job, URL) pairs become separate rows.
    async fn save(&self, job_id: &str, url: &str, content: &str) -> StoreResult<()>;

    /// Every stored row for a job, in insertion order.
    async fn get_all(&self, job_id: &str) -> StoreResult<Vec<CrawledPage>>;
}
