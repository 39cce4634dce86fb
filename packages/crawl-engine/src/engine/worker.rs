//! Breadth-first traversal from a single seed.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::CrawlConfig;
use crate::error::{CrawlError, CrawlResult, WorkerError, WorkerResult};
use crate::links::extract_links;
use crate::traits::fetcher::PageFetcher;
use crate::traits::store::ContentStore;
use crate::types::FetchedPage;

/// What one seed worker produced.
#[derive(Debug, Clone, Default)]
pub struct SeedCrawl {
    /// URLs fetched with a 200 response and stored by this worker.
    ///
    /// Entries are in parsed `Url` form, so a seed given as `http://A.test`
    /// appears as `http://a.test/`.
    pub visited: HashSet<String>,
    /// Number of successful fetches; never exceeds the page budget
    pub pages_crawled: usize,
}

/// Bounded BFS over the link graph reachable from one seed.
///
/// The visited set is local to the worker: two workers of the same job can
/// fetch (and store) the same URL.
pub struct SeedWorker {
    job_id: String,
    fetcher: Arc<dyn PageFetcher>,
    pages: Arc<dyn ContentStore>,
    config: Arc<CrawlConfig>,
}

impl SeedWorker {
    pub fn new(
        job_id: impl Into<String>,
        fetcher: Arc<dyn PageFetcher>,
        pages: Arc<dyn ContentStore>,
        config: Arc<CrawlConfig>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            fetcher,
            pages,
            config,
        }
    }

    /// Crawl from `seed` until the queue drains or `page_budget` pages were
    /// fetched.
    ///
    /// A failed fetch or a failed content store write is logged and the URL
    /// skipped. The URL is not marked visited, so another page linking to it
    /// queues it again and it is retried on that later dequeue. Only an
    /// unparseable seed ends the traversal with an error.
    pub async fn traverse(&self, seed: &str, page_budget: usize) -> WorkerResult<SeedCrawl> {
        let seed_url = Url::parse(seed).map_err(|source| WorkerError::InvalidSeed {
            seed: seed.to_string(),
            source,
        })?;

        let mut queue = VecDeque::from([seed_url]);
        let mut crawl = SeedCrawl::default();

        while crawl.pages_crawled < page_budget {
            let Some(url) = queue.pop_front() else {
                break;
            };

            if crawl.visited.contains(url.as_str()) {
                continue;
            }

            debug!(job_id = %self.job_id, url = %url, "Crawling");

            if !self.config.politeness_delay.is_zero() {
                tokio::time::sleep(self.config.politeness_delay).await;
            }

            let page = match self.fetch(&url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(job_id = %self.job_id, url = %url, error = %e, "Failed to fetch page");
                    continue;
                }
            };

            if let Err(e) = self
                .pages
                .save(&self.job_id, url.as_str(), &page.content)
                .await
            {
                error!(job_id = %self.job_id, url = %url, error = %e, "Failed to store page");
                continue;
            }

            let mut enqueued = 0;
            for link in extract_links(&url, &page.content) {
                if !crawl.visited.contains(link.as_str()) {
                    queue.push_back(link);
                    enqueued += 1;
                }
            }
            debug!(job_id = %self.job_id, url = %url, enqueued, "Extracted links");

            crawl.visited.insert(url.to_string());
            crawl.pages_crawled += 1;
        }

        info!(
            job_id = %self.job_id,
            seed = %seed,
            pages_crawled = crawl.pages_crawled,
            "Seed crawl finished"
        );

        Ok(crawl)
    }

    /// Fetch with the per-fetch timeout applied on top of the fetcher's own.
    async fn fetch(&self, url: &Url) -> CrawlResult<FetchedPage> {
        match tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(CrawlError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{FailingContentStore, MockFetcher};
    use std::time::Duration;

    fn worker(fetcher: &MockFetcher, store: &Arc<MemoryStore>) -> SeedWorker {
        let config = CrawlConfig::new()
            .with_politeness_delay(Duration::ZERO)
            .with_fetch_timeout(Duration::from_millis(100));
        SeedWorker::new(
            "job-1",
            Arc::new(fetcher.clone()),
            store.clone(),
            Arc::new(config),
        )
    }

    #[tokio::test]
    async fn test_cycle_fetched_once() {
        let fetcher = MockFetcher::new()
            .with_links("http://a.test/", &["http://a.test/b"])
            .with_links("http://a.test/b", &["http://a.test/", "http://a.test/b"]);
        let store = Arc::new(MemoryStore::new());

        let crawl = worker(&fetcher, &store)
            .traverse("http://a.test/", 10)
            .await
            .unwrap();

        assert_eq!(crawl.pages_crawled, 2);
        assert_eq!(fetcher.fetch_count("http://a.test/"), 1);
        assert_eq!(fetcher.fetch_count("http://a.test/b"), 1);
        assert_eq!(store.get_all("job-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_budget_fetches_nothing() {
        let fetcher = MockFetcher::new().with_links("http://a.test/", &[]);
        let store = Arc::new(MemoryStore::new());

        let crawl = worker(&fetcher, &store)
            .traverse("http://a.test/", 0)
            .await
            .unwrap();

        assert_eq!(crawl.pages_crawled, 0);
        assert!(crawl.visited.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_budget_stops_traversal() {
        let fetcher = MockFetcher::new()
            .with_links(
                "http://a.test/",
                &["http://a.test/1", "http://a.test/2", "http://a.test/3"],
            )
            .with_links("http://a.test/1", &[])
            .with_links("http://a.test/2", &[])
            .with_links("http://a.test/3", &[]);
        let store = Arc::new(MemoryStore::new());

        let crawl = worker(&fetcher, &store)
            .traverse("http://a.test/", 2)
            .await
            .unwrap();

        assert_eq!(crawl.pages_crawled, 2);
        assert_eq!(
            fetcher.calls(),
            vec!["http://a.test/".to_string(), "http://a.test/1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_bfs_order() {
        let fetcher = MockFetcher::new()
            .with_links("http://a.test/", &["http://a.test/l", "http://a.test/r"])
            .with_links("http://a.test/l", &["http://a.test/l/deep"])
            .with_links("http://a.test/r", &[])
            .with_links("http://a.test/l/deep", &[]);
        let store = Arc::new(MemoryStore::new());

        worker(&fetcher, &store)
            .traverse("http://a.test/", 10)
            .await
            .unwrap();

        assert_eq!(
            fetcher.calls(),
            vec![
                "http://a.test/".to_string(),
                "http://a.test/l".to_string(),
                "http://a.test/r".to_string(),
                "http://a.test/l/deep".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failures_are_skipped_not_visited() {
        let fetcher = MockFetcher::new()
            .with_links(
                "http://a.test/",
                &["http://a.test/missing", "http://a.test/slow", "http://a.test/ok"],
            )
            .with_status("http://a.test/missing", 500)
            .with_hang("http://a.test/slow")
            .with_links("http://a.test/ok", &[]);
        let store = Arc::new(MemoryStore::new());

        let crawl = worker(&fetcher, &store)
            .traverse("http://a.test/", 10)
            .await
            .unwrap();

        assert_eq!(crawl.pages_crawled, 2);
        assert!(crawl.visited.contains("http://a.test/ok"));
        assert!(!crawl.visited.contains("http://a.test/missing"));
        assert!(!crawl.visited.contains("http://a.test/slow"));
        // Not retried
        assert_eq!(fetcher.fetch_count("http://a.test/slow"), 1);
    }

    #[tokio::test]
    async fn test_invalid_seed_is_fatal() {
        let fetcher = MockFetcher::new();
        let store = Arc::new(MemoryStore::new());

        let err = worker(&fetcher, &store)
            .traverse("not a url", 5)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerError::InvalidSeed { .. }));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_skips_url_and_keeps_crawling() {
        let fetcher = MockFetcher::new()
            .with_links("http://a.test/", &["http://a.test/bad", "http://a.test/good"])
            .with_links("http://a.test/bad", &["http://a.test/behind-bad"])
            .with_links("http://a.test/good", &[])
            .with_links("http://a.test/behind-bad", &[]);
        let store = Arc::new(FailingContentStore::new().with_failing_url("http://a.test/bad"));
        let config = CrawlConfig::new().with_politeness_delay(Duration::ZERO);
        let worker = SeedWorker::new(
            "job-1",
            Arc::new(fetcher.clone()),
            store.clone(),
            Arc::new(config),
        );

        let crawl = worker.traverse("http://a.test/", 10).await.unwrap();

        assert_eq!(crawl.pages_crawled, 2);
        assert!(crawl.visited.contains("http://a.test/"));
        assert!(crawl.visited.contains("http://a.test/good"));
        assert!(!crawl.visited.contains("http://a.test/bad"));
        // Links of a page that could not be stored are not followed
        assert_eq!(fetcher.fetch_count("http://a.test/behind-bad"), 0);
        assert_eq!(store.get_all("job-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_url_refetched_when_linked_again() {
        let fetcher = MockFetcher::new()
            .with_links("http://a.test/", &["http://a.test/x", "http://a.test/y"])
            .with_links("http://a.test/x", &["http://a.test/down"])
            .with_links("http://a.test/y", &["http://a.test/down"])
            .with_status("http://a.test/down", 503);
        let store = Arc::new(MemoryStore::new());

        worker(&fetcher, &store)
            .traverse("http://a.test/", 10)
            .await
            .unwrap();

        assert_eq!(fetcher.fetch_count("http://a.test/down"), 2);
    }

    #[tokio::test]
    async fn test_visited_uses_parsed_url_form() {
        let fetcher = MockFetcher::new().with_links("http://a.test/", &[]);
        let store = Arc::new(MemoryStore::new());

        let crawl = worker(&fetcher, &store)
            .traverse("http://A.test", 1)
            .await
            .unwrap();

        assert!(crawl.visited.contains("http://a.test/"));
        assert!(!crawl.visited.contains("http://A.test"));
    }
}
