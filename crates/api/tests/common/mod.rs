//! Shared fixtures for the HTTP integration tests.
//!
//! The app runs against an in-memory guest directory and a recording
//! notifier, so no database or mail provider is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use domain::models::{GuestName, Invitation};
use domain::services::{InMemoryGuestDirectory, MockRsvpNotifier, RsvpNotification};
use fake::faker::name::en::FirstName;
use fake::Fake;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;
use wedding_rsvp_api::{
    app::{create_router, AppState},
    config::Config,
};

/// Configuration with rate limiting and email disabled.
pub fn test_config() -> Config {
    Config::load_for_test(&[]).expect("test config")
}

pub struct TestApp {
    pub router: Router,
    pub directory: Arc<InMemoryGuestDirectory>,
    pub notifier: Arc<MockRsvpNotifier>,
}

impl TestApp {
    pub fn new(invitations: Vec<Invitation>) -> Self {
        Self::with_config(test_config(), invitations)
    }

    pub fn with_config(config: Config, invitations: Vec<Invitation>) -> Self {
        let directory = Arc::new(InMemoryGuestDirectory::with_invitations(invitations));
        let notifier = Arc::new(MockRsvpNotifier::new());
        let state = AppState::new(config, directory.clone(), notifier.clone());
        Self {
            router: create_router(state),
            directory,
            notifier,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    /// Opens a session and returns its id.
    pub async fn start_session(&self) -> String {
        let (status, json) = self.post("/api/v1/rsvp/sessions", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::CREATED, "body: {}", json);
        json["session_id"].as_str().unwrap().to_string()
    }

    /// Opens a session, searches for `name` and selects `invitation_id`.
    pub async fn open_form(&self, name: &str, invitation_id: Uuid) -> String {
        let session = self.start_session().await;
        let (status, json) = self
            .post(&session_uri(&session, "search"), serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::OK, "body: {}", json);

        let (status, json) = self
            .post(
                &session_uri(&session, "select"),
                serde_json::json!({ "invitation_id": invitation_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "body: {}", json);
        session
    }

    /// Waits for the background notification task to report.
    pub async fn wait_for_notifications(&self, expected: usize) -> Vec<RsvpNotification> {
        for _ in 0..50 {
            let notifications = self.notifier.notifications();
            if notifications.len() >= expected {
                return notifications;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.notifier.notifications()
    }
}

pub fn session_uri(session_id: &str, action: &str) -> String {
    if action.is_empty() {
        format!("/api/v1/rsvp/sessions/{}", session_id)
    } else {
        format!("/api/v1/rsvp/sessions/{}/{}", session_id, action)
    }
}

pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if body.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!("Failed to parse response body: {:?}", String::from_utf8_lossy(&body))
    })
}

/// The Smith couple: invited to the welcome party, not the rehearsal dinner.
pub fn smith_couple() -> Invitation {
    Invitation::new(
        Uuid::new_v4(),
        vec![
            GuestName::new(1, "Jane", "Smith"),
            GuestName::new(2, "John", "Smith"),
        ],
        2,
        true,
        false,
        Some("smiths@example.com".to_string()),
        None,
    )
    .unwrap()
}

/// A single guest invited to every event, with no email on file.
pub fn solo_guest(first: &str, last: &str) -> Invitation {
    Invitation::new(
        Uuid::new_v4(),
        vec![GuestName::new(1, first, last)],
        1,
        true,
        true,
        None,
        None,
    )
    .unwrap()
}

/// Filler invitations sharing the family name `last`, with generated first
/// names.
pub fn family_invitations(last: &str, count: usize) -> Vec<Invitation> {
    (0..count)
        .map(|_| {
            let first: String = FirstName().fake();
            Invitation::new(
                Uuid::new_v4(),
                vec![GuestName::new(1, first, last)],
                2,
                false,
                false,
                None,
                None,
            )
            .unwrap()
        })
        .collect()
}
