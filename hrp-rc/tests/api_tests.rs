//! Integration tests for hrp-rc HTTP endpoints
//!
//! Tests cover:
//! - Health and build info endpoints
//! - Board projection with stage filter, search and pagination
//! - Per-stage eligibility lookup
//! - Upstream failures surfacing as 502 with the upstream message

mod helpers;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use helpers::{job_state, FakeApi};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

use hrp_rc::{build_router, AppState};

/// Test helper: Create app backed by an in-memory upstream
fn setup_app(api: FakeApi) -> axum::Router {
    build_router(AppState::new(Arc::new(api)))
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health / build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let api = FakeApi::new(job_state());
    api.limit_fetches(0);
    let app = setup_app(api);

    let response = app.oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "hrp-rc");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = setup_app(FakeApi::new(job_state()));

    let response = app.oneshot(test_request("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Board
// =============================================================================

#[tokio::test]
async fn test_board_groups_candidates_by_stage() {
    let app = setup_app(FakeApi::new(job_state()));

    let response = app.oneshot(test_request("/api/jobs/job1/board")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let columns = body["columns"].as_array().unwrap();
    let ids: Vec<&str> = columns.iter().map(|c| c["stage_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["s1", "s2", "s3"]);

    assert_eq!(columns[0]["total"], 2);
    assert_eq!(body["total_results"], 4);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 25);

    let grace = &columns[1]["cards"][0];
    assert_eq!(grace["user_id"], "u2");
    assert_eq!(grace["eligibility"]["movable"], false);
    assert_eq!(grace["eligibility"]["reason"]["code"], "AWAITING_DOCUMENTS");
    assert_eq!(grace["status_message"], "Waiting for documents: Passport");
    assert_eq!(grace["next_stage_id"], "s3");
}

#[tokio::test]
async fn test_board_search_and_stage_filter() {
    let app = setup_app(FakeApi::new(job_state()));

    let response = app
        .clone()
        .oneshot(test_request("/api/jobs/job1/board?search=rust"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["columns"][0]["cards"][0]["user_id"], "u1");

    let response = app
        .oneshot(test_request("/api/jobs/job1/board?stage=s3"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let columns = body["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0]["stage_name"], "Offer");
    assert_eq!(columns[0]["cards"][0]["next_stage_id"], Value::Null);
}

#[tokio::test]
async fn test_board_upstream_failure_is_bad_gateway() {
    let api = FakeApi::new(job_state());
    api.limit_fetches(0);
    let app = setup_app(api);

    let response = app.oneshot(test_request("/api/jobs/job1/board")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "connection reset");
}

// =============================================================================
// Eligibility
// =============================================================================

#[tokio::test]
async fn test_eligibility_endpoint() {
    let app = setup_app(FakeApi::new(job_state()));

    let response = app
        .clone()
        .oneshot(test_request("/api/jobs/job1/candidates/u4/stages/s1/eligibility"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["movable"], false);
    assert_eq!(body["reason"]["code"], "ALREADY_REVIEWED");
    assert_eq!(body["message"], "Ready for next stage");

    // A stage the candidate never reached
    let response = app
        .oneshot(test_request("/api/jobs/job1/candidates/u1/stages/s3/eligibility"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["reason"]["code"], "NO_PROGRESS_RECORD");
}

#[tokio::test]
async fn test_eligibility_unknown_candidate_is_not_found() {
    let app = setup_app(FakeApi::new(job_state()));

    let response = app
        .oneshot(test_request("/api/jobs/job1/candidates/nobody/stages/s1/eligibility"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Candidate not found: nobody");
}
