//! Job endpoints.
//!
//! POST /jobs          submit seeds, returns the job id immediately
//! GET  /jobs/:job_id  current job record

use axum::{
    extract::{Extension, Path},
    Json,
};
use crawl_engine::Job;
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Page budget used when a request omits `max_pages`.
pub const DEFAULT_MAX_PAGES: usize = 100;

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub starting_urls: Vec<String>,

    /// Applied to each seed separately, not to the job as a whole
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub job_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub completed: bool,
    pub visited_urls: Vec<String>,
    pub product_urls: Vec<String>,
    pub max_pages: usize,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            completed: job.completed,
            visited_urls: job.visited_urls,
            product_urls: job.product_urls,
            max_pages: job.max_pages,
        }
    }
}

/// Create a job and start crawling in the background.
pub async fn create_job_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>, ApiError> {
    let job_id = state
        .jobs
        .submit(request.starting_urls, request.max_pages)
        .await?;

    Ok(Json(CreateJobResponse {
        job_id,
        message: "Crawling started successfully.".to_string(),
    }))
}

/// Read a job record. Incomplete jobs report `completed: false` with empty
/// collections.
pub async fn get_job_handler(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = state.jobs.status(&job_id).await?;
    Ok(Json(job.into()))
}
