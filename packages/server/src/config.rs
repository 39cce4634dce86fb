use anyhow::{Context, Result};
use crawl_engine::CrawlConfig;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// `DATABASE_URL` value that selects the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub crawl_delay: Duration,
    pub fetch_timeout: Duration,
    pub user_agent: Option<String>,
    pub crawler_from: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://crawled_data.db".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            crawl_delay: match env::var("CRAWL_DELAY_MS") {
                Ok(ms) => Duration::from_millis(
                    ms.parse().context("CRAWL_DELAY_MS must be a number of milliseconds")?,
                ),
                Err(_) => crawl_engine::config::DEFAULT_POLITENESS_DELAY,
            },
            fetch_timeout: match env::var("CRAWL_FETCH_TIMEOUT_SECS") {
                Ok(secs) => Duration::from_secs(
                    secs.parse()
                        .context("CRAWL_FETCH_TIMEOUT_SECS must be a number of seconds")?,
                ),
                Err(_) => crawl_engine::config::DEFAULT_FETCH_TIMEOUT,
            },
            user_agent: env::var("CRAWLER_USER_AGENT").ok(),
            crawler_from: env::var("CRAWLER_FROM").ok(),
        })
    }

    /// Whether jobs live only in memory.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }

    /// Engine settings derived from this configuration.
    pub fn crawl_config(&self) -> CrawlConfig {
        let mut config = CrawlConfig::new()
            .with_politeness_delay(self.crawl_delay)
            .with_fetch_timeout(self.fetch_timeout);

        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        if let Some(from) = &self.crawler_from {
            config = config.with_from(from.clone());
        }
        config
    }
}
