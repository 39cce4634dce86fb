//! HTTP-level tests for the job endpoints, run against an in-memory stack.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use crawl_engine::testing::MockFetcher;
use crawl_engine::{CrawlConfig, CrawlEngine, JobService, MemoryStore};
use serde_json::{json, Value};
use server_core::server::{build_app, AppState};
use tower::ServiceExt;

fn test_app(fetcher: MockFetcher) -> (Router, JobService) {
    let store = Arc::new(MemoryStore::new());
    let config = CrawlConfig::new()
        .with_politeness_delay(Duration::ZERO)
        .with_fetch_timeout(Duration::from_millis(200));
    let jobs = JobService::new(CrawlEngine::new(
        Arc::new(fetcher),
        store.clone(),
        store,
        config,
    ));
    (build_app(AppState::new(jobs.clone())), jobs)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_job(body: Value) -> Request<Body> {
    Request::post("/jobs")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_job(job_id: &str) -> Request<Body> {
    Request::get(format!("/jobs/{job_id}"))
        .body(Body::empty())
        .unwrap()
}

async fn wait_for_completion(app: &Router, job_id: &str) -> Value {
    for _ in 0..100 {
        let (status, body) = send(app, get_job(job_id)).await;
        assert_eq!(status, StatusCode::OK);
        if body["completed"] == true {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {job_id} did not complete");
}

#[tokio::test]
async fn create_then_poll_until_completed() {
    let fetcher = MockFetcher::new()
        .with_links(
            "http://shop.test/",
            &["http://shop.test/product/blue-widget", "http://shop.test/about"],
        )
        .with_links("http://shop.test/product/blue-widget", &[])
        .with_links("http://shop.test/about", &[]);
    let (app, _) = test_app(fetcher);

    let (status, created) = send(
        &app,
        post_job(json!({"starting_urls": ["http://shop.test/"], "max_pages": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["message"], "Crawling started successfully.");
    let job_id = created["job_id"].as_str().unwrap().to_string();

    let body = wait_for_completion(&app, &job_id).await;
    assert_eq!(body["job_id"], job_id.as_str());
    assert_eq!(body["max_pages"], 10);
    assert_eq!(
        body["visited_urls"],
        json!([
            "http://shop.test/",
            "http://shop.test/about",
            "http://shop.test/product/blue-widget"
        ])
    );
    assert_eq!(
        body["product_urls"],
        json!(["http://shop.test/product/blue-widget"])
    );
}

#[tokio::test]
async fn pending_job_reports_empty_collections() {
    let fetcher = MockFetcher::new().with_hang("http://slow.test/");
    let (app, _) = test_app(fetcher);

    let (_, created) = send(
        &app,
        post_job(json!({"starting_urls": ["http://slow.test/"]})),
    )
    .await;
    let job_id = created["job_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get_job(&job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], false);
    assert_eq!(body["visited_urls"], json!([]));
    assert_eq!(body["product_urls"], json!([]));
    assert_eq!(body["max_pages"], 100);

    let body = wait_for_completion(&app, &job_id).await;
    assert_eq!(body["visited_urls"], json!([]));
}

#[tokio::test]
async fn converging_seeds_listed_once() {
    let fetcher = MockFetcher::new()
        .with_links("http://x.test/", &["http://shared.test/page"])
        .with_links("http://y.test/", &["http://shared.test/page"])
        .with_links("http://shared.test/page", &[]);
    let (app, jobs) = test_app(fetcher);

    let (_, created) = send(
        &app,
        post_job(json!({
            "starting_urls": ["http://x.test/", "http://y.test/"],
            "max_pages": 5
        })),
    )
    .await;
    let job_id = created["job_id"].as_str().unwrap().to_string();

    let body = wait_for_completion(&app, &job_id).await;
    let visited = body["visited_urls"].as_array().unwrap();
    assert_eq!(
        visited
            .iter()
            .filter(|u| *u == "http://shared.test/page")
            .count(),
        1
    );

    let stored = jobs.stored_page_urls(&job_id).await.unwrap();
    assert_eq!(
        stored
            .iter()
            .filter(|u| *u == "http://shared.test/page")
            .count(),
        2
    );
}

#[tokio::test]
async fn unknown_job_is_404() {
    let (app, _) = test_app(MockFetcher::new());

    let (status, body) = send(&app, get_job("no-such-job")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Job not found"}));
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let (app, _) = test_app(MockFetcher::new());

    let (status, _) = send(&app, post_job(json!({"max_pages": 3}))).await;
    assert!(status.is_client_error());
}
