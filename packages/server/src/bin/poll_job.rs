//! Submit a crawl job to a running server and poll it until it completes.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use server_core::server::routes::{CreateJobRequest, CreateJobResponse, JobStatusResponse};

#[derive(Parser)]
#[command(name = "poll_job")]
#[command(about = "Submit seed URLs and print job status every second until completed")]
struct Cli {
    /// Seed URLs to crawl
    #[arg(required = true)]
    starting_urls: Vec<String>,

    /// Page budget per seed
    #[arg(long, default_value_t = 200)]
    max_pages: usize,

    /// Base URL of the crawl API
    #[arg(long, default_value = "http://localhost:8000")]
    server: String,

    /// Seconds between status polls
    #[arg(long, default_value_t = 1)]
    interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.server.trim_end_matches('/');

    let response = client
        .post(format!("{base}/jobs"))
        .json(&CreateJobRequest {
            starting_urls: cli.starting_urls,
            max_pages: cli.max_pages,
        })
        .send()
        .await
        .context("Failed to submit job")?;

    if !response.status().is_success() {
        bail!("Job submission failed: HTTP {}", response.status());
    }

    let created: CreateJobResponse = response
        .json()
        .await
        .context("Invalid job submission response")?;
    println!("Job created: {}", created.job_id);

    loop {
        let status: JobStatusResponse = client
            .get(format!("{base}/jobs/{}", created.job_id))
            .send()
            .await
            .context("Failed to fetch job status")?
            .error_for_status()
            .context("Job status request failed")?
            .json()
            .await
            .context("Invalid job status response")?;

        println!("{}", serde_json::to_string_pretty(&status)?);

        if status.completed {
            break;
        }

        tokio::time::sleep(Duration::from_secs(cli.interval)).await;
    }

    Ok(())
}
