//! Integration tests for the stateless guest search endpoint.

mod common;

use axum::http::StatusCode;
use common::{family_invitations, smith_couple, TestApp};
use domain::services::MAX_SEARCH_RESULTS;

#[tokio::test]
async fn test_search_finds_invitation_by_last_name() {
    let invitation = smith_couple();
    let app = TestApp::new(vec![invitation.clone()]);

    let (status, json) = app.get("/api/v1/guests/search?name=Smith").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "found");
    let candidates = json["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["id"], invitation.id.to_string());
    assert_eq!(candidates[0]["guests"].as_array().unwrap().len(), 2);
    assert_eq!(candidates[0]["similarity_score"], 1.0);
}

#[tokio::test]
async fn test_search_trims_and_collapses_whitespace() {
    let app = TestApp::new(vec![smith_couple()]);

    let (status, json) = app
        .get("/api/v1/guests/search?name=%20%20Jane%20%20%20Smith%20")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "found");
}

#[tokio::test]
async fn test_search_without_match_returns_guidance() {
    let app = TestApp::new(vec![smith_couple()]);

    let (status, json) = app.get("/api/v1/guests/search?name=Zebulon").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "no_match");
    assert_eq!(
        json["guidance"]["headline"],
        "We couldn't find your invitation."
    );
    assert_eq!(json["guidance"]["suggestions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_blank_search_is_rejected_without_directory_call() {
    let app = TestApp::new(vec![smith_couple()]);

    let (status, json) = app.get("/api/v1/guests/search?name=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["message"], "Please enter at least a first or last name");

    let (status, _) = app.get("/api/v1/guests/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.directory.search_calls(), 0);
}

#[tokio::test]
async fn test_overlong_search_is_rejected() {
    let app = TestApp::new(vec![smith_couple()]);
    let name = "a".repeat(101);

    let (status, json) = app
        .get(&format!("/api/v1/guests/search?name={}", name))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Search term must be at most 100 characters");
    assert_eq!(app.directory.search_calls(), 0);
}

#[tokio::test]
async fn test_directory_outage_is_service_unavailable() {
    let app = TestApp::new(vec![smith_couple()]);
    app.directory.set_search_unavailable(true);

    let (status, json) = app.get("/api/v1/guests/search?name=Smith").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "service_unavailable");
    assert_eq!(
        json["message"],
        "An error occurred while searching. Please try again."
    );
}

#[tokio::test]
async fn test_results_are_capped() {
    let app = TestApp::new(family_invitations("Okonkwo", MAX_SEARCH_RESULTS + 5));

    let (status, json) = app.get("/api/v1/guests/search?name=Okonkwo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["candidates"].as_array().unwrap().len(),
        MAX_SEARCH_RESULTS
    );
}
