//! Job records.

use serde::{Deserialize, Serialize};

/// One crawl request and its accumulated results.
///
/// A job is written twice: once at submission (not completed, empty
/// collections) and once when every seed worker has returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Opaque unique identifier
    pub job_id: String,

    /// Seeds in submission order
    pub starting_urls: Vec<String>,

    /// Page budget applied to each seed independently
    pub max_pages: usize,

    /// Set once, when the engine finishes
    pub completed: bool,

    /// Merged visited set across all seeds (no duplicates)
    pub visited_urls: Vec<String>,

    /// Subset of `visited_urls` classified as product pages
    pub product_urls: Vec<String>,
}

impl Job {
    /// Create a fresh, not yet completed job.
    pub fn new(job_id: impl Into<String>, starting_urls: Vec<String>, max_pages: usize) -> Self {
        Self {
            job_id: job_id.into(),
            starting_urls,
            max_pages,
            completed: false,
            visited_urls: Vec::new(),
            product_urls: Vec::new(),
        }
    }

    pub fn status(&self) -> JobStatus {
        if self.completed {
            JobStatus::Completed
        } else {
            JobStatus::Pending
        }
    }
}

/// Observable job state.
///
/// A running job is not stored separately; until the final update it reads
/// as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Completed,
}
