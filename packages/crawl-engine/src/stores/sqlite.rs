//! SQLite storage implementation.
//!
//! A file-based storage backend using SQLite. Good for:
//! - Single-process deployments
//! - Local development
//! - Testing with an in-memory database
//!
//! Layout: a `jobs` table keyed by job id, three owned URL collections
//! joined to it by `job_id`, and an append-only `crawled_pages` table with
//! no uniqueness constraint.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, Transaction};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::{ContentStore, JobStore};
use crate::types::{CrawledPage, Job};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        job_id TEXT PRIMARY KEY,
        completed INTEGER NOT NULL DEFAULT 0,
        max_pages INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_starting_urls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id TEXT NOT NULL REFERENCES jobs(job_id),
        url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_visited_urls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id TEXT NOT NULL REFERENCES jobs(job_id),
        url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_product_urls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id TEXT NOT NULL REFERENCES jobs(job_id),
        url TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS crawled_pages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id TEXT NOT NULL,
        url TEXT NOT NULL,
        content TEXT NOT NULL,
        fetched_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_job_starting_urls_job_id ON job_starting_urls(job_id)",
    "CREATE INDEX IF NOT EXISTS idx_job_visited_urls_job_id ON job_visited_urls(job_id)",
    "CREATE INDEX IF NOT EXISTS idx_job_product_urls_job_id ON job_product_urls(job_id)",
    "CREATE INDEX IF NOT EXISTS idx_crawled_pages_job_id ON crawled_pages(job_id)",
];

/// Owned URL collections of a job. Table names are fixed, never user input.
#[derive(Debug, Clone, Copy)]
enum UrlCollection {
    Starting,
    Visited,
    Product,
}

impl UrlCollection {
    fn table(self) -> &'static str {
        match self {
            Self::Starting => "job_starting_urls",
            Self::Visited => "job_visited_urls",
            Self::Product => "job_product_urls",
        }
    }
}

/// SQLite-backed job and content store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite://crawled_data.db` - File-based database, created if missing
    /// - `sqlite::memory:` - Use [`SqliteStore::in_memory`] instead
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(StoreError::backend)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StoreError::backend)?;

        Self::from_pool(pool).await
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// Every connection to `:memory:` is a separate database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(StoreError::backend)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StoreError::backend)?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and make sure the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create tables and indexes if missing.
    async fn run_migrations(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        }
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert_urls(
        tx: &mut Transaction<'_, Sqlite>,
        collection: UrlCollection,
        job_id: &str,
        urls: &[String],
    ) -> StoreResult<()> {
        let sql = format!("INSERT INTO {} (job_id, url) VALUES (?, ?)", collection.table());
        for url in urls {
            sqlx::query(&sql)
                .bind(job_id)
                .bind(url)
                .execute(&mut **tx)
                .await
                .map_err(StoreError::backend)?;
        }
        Ok(())
    }

    async fn load_urls(
        tx: &mut Transaction<'_, Sqlite>,
        collection: UrlCollection,
        job_id: &str,
    ) -> StoreResult<Vec<String>> {
        let sql = format!(
            "SELECT url FROM {} WHERE job_id = ? ORDER BY id",
            collection.table()
        );
        sqlx::query_scalar::<_, String>(&sql)
            .bind(job_id)
            .fetch_all(&mut **tx)
            .await
            .map_err(StoreError::backend)
    }
}

// Row types for sqlx queries
#[derive(Debug, FromRow)]
struct JobRow {
    completed: bool,
    max_pages: i64,
}

#[derive(Debug, FromRow)]
struct PageRow {
    job_id: String,
    url: String,
    content: String,
    fetched_at: String,
}

impl PageRow {
    fn into_crawled_page(self) -> StoreResult<CrawledPage> {
        let fetched_at = DateTime::parse_from_rfc3339(&self.fetched_at)
            .map_err(StoreError::backend)?
            .with_timezone(&Utc);

        Ok(CrawledPage {
            job_id: self.job_id,
            url: self.url,
            content: self.content,
            fetched_at,
        })
    }
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn create(&self, job: &Job) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let inserted = sqlx::query("INSERT INTO jobs (job_id, completed, max_pages) VALUES (?, ?, ?)")
            .bind(&job.job_id)
            .bind(job.completed)
            .bind(job.max_pages as i64)
            .execute(&mut *tx)
            .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::DuplicateJob {
                    job_id: job.job_id.clone(),
                });
            }
            Err(e) => return Err(StoreError::backend(e)),
        }

        Self::insert_urls(&mut tx, UrlCollection::Starting, &job.job_id, &job.starting_urls).await?;
        Self::insert_urls(&mut tx, UrlCollection::Visited, &job.job_id, &job.visited_urls).await?;
        Self::insert_urls(&mut tx, UrlCollection::Product, &job.job_id, &job.product_urls).await?;

        tx.commit().await.map_err(StoreError::backend)
    }

    async fn update(
        &self,
        job_id: &str,
        completed: bool,
        visited_urls: &[String],
        product_urls: &[String],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let result = sqlx::query("UPDATE jobs SET completed = ? WHERE job_id = ?")
            .bind(completed)
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(StoreError::JobNotFound {
                job_id: job_id.to_string(),
            });
        }

        for collection in [UrlCollection::Visited, UrlCollection::Product] {
            let sql = format!("DELETE FROM {} WHERE job_id = ?", collection.table());
            sqlx::query(&sql)
                .bind(job_id)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::backend)?;
        }

        Self::insert_urls(&mut tx, UrlCollection::Visited, job_id, visited_urls).await?;
        Self::insert_urls(&mut tx, UrlCollection::Product, job_id, product_urls).await?;

        tx.commit().await.map_err(StoreError::backend)
    }

    async fn get(&self, job_id: &str) -> StoreResult<Job> {
        // One transaction so the scalar row and the collections come from the
        // same snapshot.
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let row = sqlx::query_as::<_, JobRow>("SELECT completed, max_pages FROM jobs WHERE job_id = ?")
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::backend)?
            .ok_or_else(|| StoreError::JobNotFound {
                job_id: job_id.to_string(),
            })?;

        let starting_urls = Self::load_urls(&mut tx, UrlCollection::Starting, job_id).await?;
        let visited_urls = Self::load_urls(&mut tx, UrlCollection::Visited, job_id).await?;
        let product_urls = Self::load_urls(&mut tx, UrlCollection::Product, job_id).await?;

        tx.commit().await.map_err(StoreError::backend)?;

        Ok(Job {
            job_id: job_id.to_string(),
            starting_urls,
            max_pages: usize::try_from(row.max_pages).unwrap_or_default(),
            completed: row.completed,
            visited_urls,
            product_urls,
        })
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn save(&self, job_id: &str, url: &str, content: &str) -> StoreResult<()> {
        sqlx::query("INSERT INTO crawled_pages (job_id, url, content, fetched_at) VALUES (?, ?, ?, ?)")
            .bind(job_id)
            .bind(url)
            .bind(content)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn get_all(&self, job_id: &str) -> StoreResult<Vec<CrawledPage>> {
        let rows = sqlx::query_as::<_, PageRow>(
            "SELECT job_id, url, content, fetched_at FROM crawled_pages WHERE job_id = ? ORDER BY id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(PageRow::into_crawled_page).collect()
    }
}
