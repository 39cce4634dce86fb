//! HTTP page fetcher backed by reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, FROM};
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::{CrawlError, CrawlResult};
use crate::traits::fetcher::PageFetcher;
use crate::types::FetchedPage;

/// Fetches pages over HTTP with the crawler's identifying headers.
///
/// Only a 200 response counts as a page; redirects are followed by the
/// client, every other status is reported as `CrawlError::Status`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher from the crawl configuration.
    pub fn new(config: &CrawlConfig) -> CrawlResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(from) = &config.from {
            let value = HeaderValue::from_str(from).map_err(|e| CrawlError::Http(Box::new(e)))?;
            headers.insert(FROM, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> CrawlResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                CrawlError::Timeout {
                    url: url.to_string(),
                }
            } else {
                CrawlError::Http(Box::new(e))
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CrawlError::Timeout {
                    url: url.to_string(),
                }
            } else {
                CrawlError::Http(Box::new(e))
            }
        })?;

        Ok(FetchedPage::new(url.clone(), content))
    }

    fn name(&self) -> &str {
        "http"
    }
}
