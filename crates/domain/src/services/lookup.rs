//! Guest lookup: free-text name search against the guest directory.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shared::validation::{normalize_search_term, validate_search_term};
use thiserror::Error;

use super::directory::{DirectoryError, GuestDirectory};
use crate::models::GuestSearchResult;

/// Remediation shown when a search finds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoMatchGuidance {
    pub headline: String,
    pub suggestions: Vec<String>,
    pub contact: String,
}

impl Default for NoMatchGuidance {
    fn default() -> Self {
        Self {
            headline: "We couldn't find your invitation.".to_string(),
            suggestions: vec![
                "Check the spelling of your name".to_string(),
                "Try using your full legal name as it appears on the invitation".to_string(),
                "Try searching with just your first or last name".to_string(),
                "If you have a hyphenated name, try with and without the hyphen".to_string(),
            ],
            contact: "Still having trouble? Please contact us for assistance.".to_string(),
        }
    }
}

/// Result of a lookup that reached the directory.
///
/// A single match is still a candidate; nothing is selected automatically.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found { candidates: Vec<GuestSearchResult> },
    NoMatch { guidance: NoMatchGuidance },
}

impl LookupOutcome {
    pub fn candidates(&self) -> &[GuestSearchResult] {
        match self {
            LookupOutcome::Found { candidates } => candidates,
            LookupOutcome::NoMatch { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The search term failed validation. No directory call was made.
    #[error("{0}")]
    InvalidTerm(String),

    /// The directory failed or timed out. Retryable.
    #[error("An error occurred while searching. Please try again.")]
    Unavailable(#[source] DirectoryError),
}

/// Searches the guest directory by name.
#[derive(Clone)]
pub struct GuestLookup {
    directory: Arc<dyn GuestDirectory>,
    timeout: Duration,
}

impl GuestLookup {
    pub fn new(directory: Arc<dyn GuestDirectory>, timeout: Duration) -> Self {
        Self { directory, timeout }
    }

    /// Validates the raw term and issues one directory search.
    ///
    /// Candidates keep the directory's ordering.
    pub async fn search(&self, raw_term: &str) -> Result<LookupOutcome, LookupError> {
        validate_search_term(raw_term).map_err(|e| {
            LookupError::InvalidTerm(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            )
        })?;
        let term = normalize_search_term(raw_term).unwrap_or_default();

        let candidates = tokio::time::timeout(self.timeout, self.directory.search_guests_by_name(&term))
            .await
            .map_err(|_| DirectoryError::Timeout)
            .and_then(|result| result)
            .map_err(|e| {
                tracing::error!(error = %e, "Guest search failed");
                LookupError::Unavailable(e)
            })?;

        tracing::debug!(results = candidates.len(), "Guest search completed");

        if candidates.is_empty() {
            Ok(LookupOutcome::NoMatch {
                guidance: NoMatchGuidance::default(),
            })
        } else {
            Ok(LookupOutcome::Found { candidates })
        }
    }
}
