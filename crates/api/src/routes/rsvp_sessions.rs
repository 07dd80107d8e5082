//! RSVP wizard session endpoints.
//!
//! Each session drives one workflow through `lookup -> form -> success`.
//! Every successful call answers with the session's current view; failed
//! calls answer with an error body and leave the view (including any
//! field errors or banner) available through `GET`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::AnswersPatch;
use domain::services::{NextOutcome, RsvpWorkflow, WorkflowView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::Session;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub invitation_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse<'a> {
    pub session_id: Uuid,
    pub view: WorkflowView<'a>,
}

fn session_response(status: StatusCode, session_id: Uuid, workflow: &RsvpWorkflow) -> Response {
    let body = SessionResponse {
        session_id,
        view: workflow.view(),
    };
    (status, Json(body)).into_response()
}

fn find_session(state: &AppState, session_id: Uuid) -> Result<Arc<Session>, ApiError> {
    state
        .sessions
        .get(session_id)
        .ok_or_else(|| ApiError::NotFound("RSVP session not found".to_string()))
}

/// Start a session at guest lookup.
///
/// POST /api/v1/rsvp/sessions
pub async fn create_session(State(state): State<AppState>) -> Result<Response, ApiError> {
    let (session_id, session) = state
        .sessions
        .create()
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
    tracing::info!(session_id = %session_id, "RSVP session started");

    let workflow = session.workflow().await;
    Ok(session_response(StatusCode::CREATED, session_id, &workflow))
}

/// GET /api/v1/rsvp/sessions/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, session_id)?;
    let workflow = session.workflow().await;
    Ok(session_response(StatusCode::OK, session_id, &workflow))
}

/// Search the guest directory from the lookup state.
///
/// POST /api/v1/rsvp/sessions/:session_id/search
pub async fn search(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, session_id)?;
    let mut workflow = session.workflow().await;

    workflow.search(&state.workflow, &request.name).await?;
    Ok(session_response(StatusCode::OK, session_id, &workflow))
}

/// Pick one of the displayed candidates and open the wizard.
///
/// POST /api/v1/rsvp/sessions/:session_id/select
pub async fn select_invitation(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectRequest>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, session_id)?;
    let mut workflow = session.workflow().await;

    workflow.select(&state.workflow, request.invitation_id)?;
    Ok(session_response(StatusCode::OK, session_id, &workflow))
}

/// Merge answer edits into the open wizard.
///
/// PATCH /api/v1/rsvp/sessions/:session_id/answers
pub async fn update_answers(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(patch): Json<AnswersPatch>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, session_id)?;
    let mut workflow = session.workflow().await;

    workflow.update_answers(patch)?;
    Ok(session_response(StatusCode::OK, session_id, &workflow))
}

/// Validate the current step and advance; submits from the last step.
///
/// POST /api/v1/rsvp/sessions/:session_id/next
pub async fn next_step(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, session_id)?;
    let mut workflow = session.workflow().await;

    match workflow.next(&state.workflow).await? {
        NextOutcome::Moved(step) => {
            tracing::debug!(session_id = %session_id, step, "Wizard advanced");
        }
        NextOutcome::Submitted { attending_any } => {
            tracing::info!(session_id = %session_id, attending_any, "RSVP submitted");
        }
    }
    Ok(session_response(StatusCode::OK, session_id, &workflow))
}

/// Step back, or return to lookup from the first step.
///
/// POST /api/v1/rsvp/sessions/:session_id/previous
pub async fn previous_step(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, session_id)?;
    let mut workflow = session.workflow().await;

    workflow.previous()?;
    Ok(session_response(StatusCode::OK, session_id, &workflow))
}

/// "Submit another RSVP": reset to an empty lookup.
///
/// POST /api/v1/rsvp/sessions/:session_id/restart
pub async fn restart(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, session_id)?;
    let mut workflow = session.workflow().await;

    workflow.restart()?;
    Ok(session_response(StatusCode::OK, session_id, &workflow))
}
