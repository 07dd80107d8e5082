//! Stateless guest lookup.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::services::LookupOutcome;
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchGuestsQuery {
    #[serde(default)]
    pub name: String,
}

/// Search invitations by guest name.
///
/// GET /api/v1/guests/search?name=<name>
pub async fn search_guests(
    State(state): State<AppState>,
    Query(query): Query<SearchGuestsQuery>,
) -> Result<Json<LookupOutcome>, ApiError> {
    let outcome = state.workflow.lookup.search(&query.name).await?;
    tracing::debug!(candidates = outcome.candidates().len(), "Guest search completed");
    Ok(Json(outcome))
}
