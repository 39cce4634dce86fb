//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{ContentStore, JobStore};
use crate::types::{CrawledPage, Job};

/// In-memory storage for jobs and crawled pages.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
pub struct MemoryStore {
    jobs: RwLock<HashMap<String, Job>>,
    pages: RwLock<Vec<CrawledPage>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            pages: RwLock::new(Vec::new()),
        }
    }

    /// Get the number of stored jobs.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Get the number of stored page rows across all jobs.
    pub async fn page_count(&self) -> usize {
        self.pages.read().await.len()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&self, job: &Job) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.job_id) {
            return Err(StoreError::DuplicateJob {
                job_id: job.job_id.clone(),
            });
        }
        jobs.insert(job.job_id.clone(), job.clone());
        Ok(())
    }

    async fn update(
        &self,
        job_id: &str,
        completed: bool,
        visited_urls: &[String],
        product_urls: &[String],
    ) -> StoreResult<()> {
        // Single write guard: readers see the old record or the new one.
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(job_id).ok_or_else(|| StoreError::JobNotFound {
            job_id: job_id.to_string(),
        })?;

        job.completed = completed;
        job.visited_urls = visited_urls.to_vec();
        job.product_urls = product_urls.to_vec();
        Ok(())
    }

    async fn get(&self, job_id: &str) -> StoreResult<Job> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| StoreError::JobNotFound {
                job_id: job_id.to_string(),
            })
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn save(&self, job_id: &str, url: &str, content: &str) -> StoreResult<()> {
        self.pages
            .write()
            .await
            .push(CrawledPage::new(job_id, url, content));
        Ok(())
    }

    async fn get_all(&self, job_id: &str) -> StoreResult<Vec<CrawledPage>> {
        Ok(self
            .pages
            .read()
            .await
            .iter()
            .filter(|p| p.job_id == job_id)
            .cloned()
            .collect())
    }
}
