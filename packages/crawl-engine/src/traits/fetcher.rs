use async_trait::async_trait;
use url::Url;

use crate::error::CrawlResult;
use crate::types::FetchedPage;

/// Network access for seed workers.
///
/// Implementations return `Ok` only for HTTP 200; every other outcome is a
/// `CrawlError` that the worker logs and skips.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single page.
    async fn fetch(&self, url: &Url) -> CrawlResult<FetchedPage>;

    /// Name used in logs.
    fn name(&self) -> &str;
}
