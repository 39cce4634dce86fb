//! Concurrent seed crawler with product page classification.
//!
//! A job is a list of seed URLs and a per-seed page budget. Each seed gets
//! its own breadth-first worker; when every worker has returned, the visited
//! sets are merged, product pages are picked out by URL shape, and the job
//! record is completed in a single write.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crawl_engine::{CrawlConfig, CrawlEngine, HttpFetcher, JobService, MemoryStore};
//!
//! let config = CrawlConfig::default();
//! let store = Arc::new(MemoryStore::new());
//! let fetcher = Arc::new(HttpFetcher::new(&config)?);
//! let service = JobService::new(CrawlEngine::new(fetcher, store.clone(), store, config));
//!
//! let job_id = service.submit(vec!["https://shop.example/".into()], 100).await?;
//! let job = service.status(&job_id).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams: PageFetcher, JobStore, ContentStore, Classifier
//! - [`engine`] - Per-seed workers and job orchestration
//! - [`service`] - Job submission and lookup
//! - [`stores`] - MemoryStore and (feature `sqlite`) SqliteStore
//! - [`fetchers`] - reqwest-backed HttpFetcher
//! - [`testing`] - MockFetcher for tests without network access

pub mod config;
pub mod engine;
pub mod error;
pub mod fetchers;
pub mod links;
pub mod service;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use config::CrawlConfig;
pub use engine::{CrawlEngine, CrawlReport, JobHandle, SeedCrawl, SeedReport, SeedWorker};
pub use error::{
    CrawlError, CrawlResult, EngineError, EngineResult, StoreError, StoreResult, WorkerError,
    WorkerResult,
};
pub use fetchers::HttpFetcher;
pub use links::extract_links;
pub use service::JobService;
pub use traits::{
    classifier::{Classifier, ProductUrlClassifier},
    fetcher::PageFetcher,
    store::{ContentStore, JobStore},
};
pub use types::{CrawledPage, FetchedPage, Job, JobStatus};

pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;
