//! Page types - fetched responses and stored page rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A successful (HTTP 200) response body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: Url,

    /// Raw response body
    pub content: String,
}

impl FetchedPage {
    pub fn new(url: Url, content: impl Into<String>) -> Self {
        Self {
            url,
            content: content.into(),
        }
    }
}

/// One stored fetch of a page for a job.
///
/// Append-only. Two workers of the same job may both store the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawledPage {
    pub job_id: String,
    pub url: String,
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

impl CrawledPage {
    /// Create a page row stamped with the current time.
    pub fn new(
        job_id: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            url: url.into(),
            content: content.into(),
            fetched_at: Utc::now(),
        }
    }
}
