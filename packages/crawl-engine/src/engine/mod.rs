//! Crawl orchestration.
//!
//! ```text
//! CrawlEngine::run(job)
//!     │
//!     ├─► spawn SeedWorker per seed ──► fetch / store / enqueue (concurrently)
//!     ├─► join all workers (each result inspected on its own)
//!     ├─► merge visited sets, classify
//!     └─► JobStore::update(completed = true)
//! ```
//!
//! There is no admission control: every submitted job spawns its workers
//! immediately, so many large jobs at once can exhaust sockets and memory.

pub mod worker;

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::CrawlConfig;
use crate::error::{EngineError, EngineResult, WorkerError, WorkerResult};
use crate::traits::classifier::{Classifier, ProductUrlClassifier};
use crate::traits::fetcher::PageFetcher;
use crate::traits::store::{ContentStore, JobStore};

pub use worker::{SeedCrawl, SeedWorker};

/// Outcome of one seed within a finished job.
#[derive(Debug)]
pub struct SeedReport {
    pub seed: String,
    pub outcome: WorkerResult<SeedCrawl>,
}

impl SeedReport {
    pub fn pages_crawled(&self) -> usize {
        self.outcome.as_ref().map(|c| c.pages_crawled).unwrap_or(0)
    }

    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Summary of a completed job run.
#[derive(Debug)]
pub struct CrawlReport {
    pub job_id: String,
    /// Successful fetches across all seeds, cross-seed duplicates included
    pub pages_crawled: usize,
    /// Merged, deduplicated, sorted
    pub visited_urls: Vec<String>,
    pub product_urls: Vec<String>,
    /// One entry per seed, in submission order
    pub seeds: Vec<SeedReport>,
}

impl CrawlReport {
    /// Seeds whose worker failed fatally.
    pub fn failures(&self) -> impl Iterator<Item = &SeedReport> {
        self.seeds.iter().filter(|s| s.is_failure())
    }
}

/// Runs jobs: one concurrent worker per seed, then a single completion write.
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    jobs: Arc<dyn JobStore>,
    pages: Arc<dyn ContentStore>,
    classifier: Arc<dyn Classifier>,
    config: Arc<CrawlConfig>,
}

impl CrawlEngine {
    /// Create an engine using the default product URL heuristics.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        jobs: Arc<dyn JobStore>,
        pages: Arc<dyn ContentStore>,
        config: CrawlConfig,
    ) -> Self {
        Self {
            fetcher,
            jobs,
            pages,
            classifier: Arc::new(ProductUrlClassifier::new()),
            config: Arc::new(config),
        }
    }

    /// Replace the classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn job_store(&self) -> &Arc<dyn JobStore> {
        &self.jobs
    }

    pub fn content_store(&self) -> &Arc<dyn ContentStore> {
        &self.pages
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    fn worker(&self, job_id: &str) -> SeedWorker {
        SeedWorker::new(
            job_id,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.pages),
            Arc::clone(&self.config),
        )
    }

    /// Crawl every seed of an existing, not yet completed job and write the
    /// final record.
    ///
    /// `max_pages` is a per-seed budget: two seeds with `max_pages = 200`
    /// may fetch up to 400 pages in total.
    ///
    /// A page that cannot be fetched or stored is skipped within its seed.
    /// A seed whose worker fails fatally contributes nothing; the job is
    /// still completed with the other seeds' results. Only a failure of the
    /// final update leaves the job incomplete.
    pub async fn run(
        &self,
        job_id: &str,
        seeds: &[String],
        max_pages: usize,
    ) -> EngineResult<CrawlReport> {
        info!(
            job_id = %job_id,
            seeds = seeds.len(),
            max_pages,
            fetcher = self.fetcher.name(),
            "Starting crawl"
        );

        let handles: Vec<(String, JoinHandle<WorkerResult<SeedCrawl>>)> = seeds
            .iter()
            .map(|seed| {
                let worker = self.worker(job_id);
                let task_seed = seed.clone();
                let handle =
                    tokio::spawn(async move { worker.traverse(&task_seed, max_pages).await });
                (seed.clone(), handle)
            })
            .collect();

        let joined = join_all(
            handles
                .into_iter()
                .map(|(seed, handle)| async move { (seed, handle.await) }),
        )
        .await;

        let mut visited = BTreeSet::new();
        let mut pages_crawled = 0;
        let mut reports = Vec::with_capacity(joined.len());

        for (seed, result) in joined {
            let outcome = result.unwrap_or_else(|e| {
                Err(WorkerError::Aborted {
                    seed: seed.clone(),
                    message: e.to_string(),
                })
            });

            match &outcome {
                Ok(crawl) => {
                    pages_crawled += crawl.pages_crawled;
                    visited.extend(crawl.visited.iter().cloned());
                }
                Err(e) => {
                    error!(
                        job_id = %job_id,
                        seed = %seed,
                        error = %e,
                        "Seed worker failed, completing job with remaining seeds"
                    );
                }
            }

            reports.push(SeedReport { seed, outcome });
        }

        let visited_urls: Vec<String> = visited.into_iter().collect();
        let product_urls = self.classifier.classify(&visited_urls);

        self.jobs
            .update(job_id, true, &visited_urls, &product_urls)
            .await
            .map_err(|source| EngineError::Complete {
                job_id: job_id.to_string(),
                source,
            })?;

        info!(
            job_id = %job_id,
            pages_crawled,
            visited = visited_urls.len(),
            products = product_urls.len(),
            "Crawling completed"
        );

        Ok(CrawlReport {
            job_id: job_id.to_string(),
            pages_crawled,
            visited_urls,
            product_urls,
            seeds: reports,
        })
    }

    /// Run a job on its own task and return a handle to it.
    pub fn spawn(
        self: &Arc<Self>,
        job_id: String,
        seeds: Vec<String>,
        max_pages: usize,
    ) -> JobHandle {
        let engine = Arc::clone(self);
        let task_job_id = job_id.clone();
        let handle =
            tokio::spawn(async move { engine.run(&task_job_id, &seeds, max_pages).await });

        JobHandle { job_id, handle }
    }
}

/// A job running in the background.
///
/// Awaiting [`JobHandle::wait`] turns a panic or cancellation of the task
/// into an [`EngineError`] attributed to the job.
pub struct JobHandle {
    job_id: String,
    handle: JoinHandle<EngineResult<CrawlReport>>,
}

impl JobHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job task to finish.
    pub async fn wait(self) -> EngineResult<CrawlReport> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(EngineError::Aborted {
                job_id: self.job_id,
                message: e.to_string(),
            }),
        }
    }
}
