use std::time::Duration;

/// Default wait before every fetch a worker makes.
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_millis(200);

/// Default upper bound on a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `User-Agent` header sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Shoppin' Crawler";

/// Tuning knobs shared by every seed worker of every job.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Fixed delay before each fetch
    pub politeness_delay: Duration,
    /// Per-fetch timeout; the only bound on how long a job can hang
    pub fetch_timeout: Duration,
    pub user_agent: String,
    /// Contact address sent in the `From` header
    pub from: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            from: None,
        }
    }
}

impl CrawlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}
