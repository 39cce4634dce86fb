//! Testing utilities including a scripted fetcher.
//!
//! Lets engine and API tests describe a link graph without network access.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use url::Url;

use crate::error::{CrawlError, CrawlResult, StoreError, StoreResult};
use crate::stores::MemoryStore;
use crate::traits::fetcher::PageFetcher;
use crate::traits::store::ContentStore;
use crate::types::{CrawledPage, FetchedPage};

/// Canned outcome for one URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// HTTP 200 with this body
    Page(String),
    /// Any other status code
    Status(u16),
    /// Never completes; exercises the per-fetch timeout
    Hang,
    /// Panics inside the fetch call
    Panic,
}

/// Build an HTML body containing one anchor per link.
pub fn links_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!("<a href=\"{link}\">{link}</a>\n"))
        .collect();
    format!("<html><body>\n{anchors}</body></html>")
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Mock fetcher for testing.
///
/// URLs without a canned response answer 404. Clones share responses and
/// the call log.
#[derive(Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response for a URL.
    pub fn respond(&self, url: &str, response: MockResponse) {
        self.responses
            .write()
            .unwrap()
            .insert(normalize(url), response);
    }

    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.respond(url, MockResponse::Page(html.into()));
        self
    }

    /// Serve a page whose only content is anchors to `links`.
    pub fn with_links(self, url: &str, links: &[&str]) -> Self {
        self.with_page(url, links_page(links))
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.respond(url, MockResponse::Status(status));
        self
    }

    pub fn with_hang(self, url: &str) -> Self {
        self.respond(url, MockResponse::Hang);
        self
    }

    pub fn with_panic(self, url: &str) -> Self {
        self.respond(url, MockResponse::Panic);
        self
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// How many times `url` was requested.
    pub fn fetch_count(&self, url: &str) -> usize {
        let url = normalize(url);
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| **c == url)
            .count()
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> CrawlResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        let response = self.responses.read().unwrap().get(url.as_str()).cloned();

        match response {
            Some(MockResponse::Page(html)) => Ok(FetchedPage::new(url.clone(), html)),
            Some(MockResponse::Status(status)) => Err(CrawlError::Status {
                url: url.to_string(),
                status,
            }),
            Some(MockResponse::Hang) => {
                std::future::pending::<()>().await;
                Err(CrawlError::Timeout {
                    url: url.to_string(),
                })
            }
            Some(MockResponse::Panic) => panic!("mock fetch panicked for {url}"),
            None => Err(CrawlError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Content store that rejects saves for chosen URLs and keeps the rest in
/// an inner [`MemoryStore`].
#[derive(Default)]
pub struct FailingContentStore {
    inner: MemoryStore,
    failing: HashSet<String>,
}

impl FailingContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every save of `url` fails with a backend error.
    pub fn with_failing_url(mut self, url: &str) -> Self {
        self.failing.insert(normalize(url));
        self
    }
}

#[async_trait]
impl ContentStore for FailingContentStore {
    async fn save(&self, job_id: &str, url: &str, content: &str) -> StoreResult<()> {
        if self.failing.contains(url) {
            return Err(StoreError::backend(std::io::Error::other(format!(
                "write rejected for {url}"
            ))));
        }
        self.inner.save(job_id, url, content).await
    }

    async fn get_all(&self, job_id: &str) -> StoreResult<Vec<CrawledPage>> {
        self.inner.get_all(job_id).await
    }
}
