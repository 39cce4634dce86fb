//! Job submission and lookup.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::engine::{CrawlEngine, JobHandle};
use crate::error::StoreResult;
use crate::traits::store::{ContentStore, JobStore};
use crate::types::Job;

/// Front door for callers: creates job records and hands them to the engine.
#[derive(Clone)]
pub struct JobService {
    engine: Arc<CrawlEngine>,
}

impl JobService {
    pub fn new(engine: CrawlEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &Arc<CrawlEngine> {
        &self.engine
    }

    /// Persist a new job and start crawling it in the background.
    ///
    /// The job record exists before this returns, so a status lookup with
    /// the returned id never misses. Seeds are not validated here; a bad
    /// seed fails only its own worker.
    pub async fn start(
        &self,
        starting_urls: Vec<String>,
        max_pages: usize,
    ) -> StoreResult<JobHandle> {
        let job_id = Uuid::new_v4().to_string();
        let job = Job::new(job_id.clone(), starting_urls.clone(), max_pages);

        self.engine.job_store().create(&job).await?;

        info!(job_id = %job_id, seeds = starting_urls.len(), max_pages, "Job submitted");

        Ok(self.engine.spawn(job_id, starting_urls, max_pages))
    }

    /// Like [`JobService::start`], but detaches the job. Failures are logged
    /// with the job id.
    pub async fn submit(
        &self,
        starting_urls: Vec<String>,
        max_pages: usize,
    ) -> StoreResult<String> {
        let handle = self.start(starting_urls, max_pages).await?;
        let job_id = handle.job_id().to_string();

        tokio::spawn(async move {
            let job_id = handle.job_id().to_string();
            if let Err(e) = handle.wait().await {
                error!(job_id = %job_id, error = %e, "Crawl job failed");
            }
        });

        Ok(job_id)
    }

    /// Current job record. Pending until every seed worker has returned.
    pub async fn status(&self, job_id: &str) -> StoreResult<Job> {
        self.engine.job_store().get(job_id).await
    }

    /// URLs of every stored fetch for the job, in storage order.
    ///
    /// Unlike the job record this is per-fetch: a URL reached from two seeds
    /// appears twice, and pages show up while the job is still running.
    pub async fn stored_page_urls(&self, job_id: &str) -> StoreResult<Vec<String>> {
        let pages = self.engine.content_store().get_all(job_id).await?;
        Ok(pages.into_iter().map(|p| p.url).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use crate::error::StoreError;
    use crate::stores::MemoryStore;
    use crate::testing::MockFetcher;
    use crate::types::JobStatus;
    use std::time::Duration;

    fn service(fetcher: MockFetcher) -> JobService {
        let store = Arc::new(MemoryStore::new());
        let config = CrawlConfig::new()
            .with_politeness_delay(Duration::ZERO)
            .with_fetch_timeout(Duration::from_millis(100));
        JobService::new(CrawlEngine::new(
            Arc::new(fetcher),
            store.clone(),
            store,
            config,
        ))
    }

    #[tokio::test]
    async fn test_job_visible_before_crawl_finishes() {
        let fetcher = MockFetcher::new().with_hang("http://slow.test/");
        let service = service(fetcher);

        let handle = service
            .start(vec!["http://slow.test/".to_string()], 1)
            .await
            .unwrap();

        let job = service.status(handle.job_id()).await.unwrap();
        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(job.starting_urls, vec!["http://slow.test/".to_string()]);

        let report = handle.wait().await.unwrap();
        assert_eq!(report.pages_crawled, 0);
        assert!(service.status(&report.job_id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_job_ids_are_unique() {
        let service = service(MockFetcher::new());

        let a = service.submit(vec![], 1).await.unwrap();
        let b = service.submit(vec![], 1).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_seed_list_completes_empty() {
        let service = service(MockFetcher::new());

        let handle = service.start(vec![], 10).await.unwrap();
        let job_id = handle.job_id().to_string();
        handle.wait().await.unwrap();

        let job = service.status(&job_id).await.unwrap();
        assert!(job.completed);
        assert!(job.visited_urls.is_empty());
    }

    #[tokio::test]
    async fn test_stored_page_urls_keeps_duplicates() {
        let fetcher = MockFetcher::new()
            .with_links("http://a.test/", &["http://shared.test/"])
            .with_links("http://b.test/", &["http://shared.test/"])
            .with_links("http://shared.test/", &[]);
        let service = service(fetcher);

        let handle = service
            .start(
                vec!["http://a.test/".to_string(), "http://b.test/".to_string()],
                5,
            )
            .await
            .unwrap();
        let job_id = handle.job_id().to_string();
        handle.wait().await.unwrap();

        let stored = service.stored_page_urls(&job_id).await.unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(
            stored.iter().filter(|u| *u == "http://shared.test/").count(),
            2
        );

        let job = service.status(&job_id).await.unwrap();
        assert_eq!(job.visited_urls.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let service = service(MockFetcher::new());

        assert!(matches!(
            service.status("nope").await,
            Err(StoreError::JobNotFound { .. })
        ));
    }
}
