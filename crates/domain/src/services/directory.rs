//! Guest directory abstraction.
//!
//! The directory is the external persistence service holding invitations
//! and RSVP responses. The workflow only consumes it through this trait:
//! a fuzzy name search and an append-only response insert.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{GuestSearchResult, Invitation, NewRsvpResponse, RsvpResponse};

/// Maximum number of candidates returned by a search.
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Errors reported by the guest directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("Guest directory unavailable: {0}")]
    Unavailable(String),

    #[error("Guest directory request timed out")]
    Timeout,

    #[error("Guest directory rejected the record: {0}")]
    Rejected(String),

    #[error("Guest directory returned a malformed record: {0}")]
    Corrupt(String),
}

/// The guest directory as seen by the RSVP workflow.
#[async_trait::async_trait]
pub trait GuestDirectory: Send + Sync {
    /// Fuzzy match across every guest name of every invitation.
    ///
    /// Results are ordered by similarity score, highest first.
    async fn search_guests_by_name(
        &self,
        search_term: &str,
    ) -> Result<Vec<GuestSearchResult>, DirectoryError>;

    /// Append one immutable response row.
    ///
    /// Inserting the same (invitation, guest position, submission id) twice
    /// returns the row written the first time.
    async fn insert_rsvp(&self, record: NewRsvpResponse) -> Result<RsvpResponse, DirectoryError>;

    /// Cheap connectivity check used by health probes.
    async fn ping(&self) -> bool;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Guest directory held in memory.
///
/// Used for local development and tests. Supports failure injection so the
/// error paths of the workflow can be exercised.
#[derive(Debug, Default)]
pub struct InMemoryGuestDirectory {
    invitations: Mutex<Vec<Invitation>>,
    responses: Mutex<Vec<RsvpResponse>>,
    failing_positions: Mutex<HashSet<u8>>,
    search_unavailable: AtomicBool,
    insert_delay: Mutex<Option<Duration>>,
    search_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl InMemoryGuestDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invitations(invitations: Vec<Invitation>) -> Self {
        let directory = Self::new();
        *lock(&directory.invitations) = invitations;
        directory
    }

    pub fn add_invitation(&self, invitation: Invitation) {
        lock(&self.invitations).push(invitation);
    }

    /// Make inserts for the given guest position fail.
    pub fn fail_inserts_for_position(&self, position: u8) {
        lock(&self.failing_positions).insert(position);
    }

    /// Let every insert succeed again.
    pub fn clear_insert_failures(&self) {
        lock(&self.failing_positions).clear();
    }

    /// Make searches fail as if the directory were unreachable.
    pub fn set_search_unavailable(&self, unavailable: bool) {
        self.search_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every insert, to simulate a hung directory.
    pub fn set_insert_delay(&self, delay: Option<Duration>) {
        *lock(&self.insert_delay) = delay;
    }

    pub fn responses(&self) -> Vec<RsvpResponse> {
        lock(&self.responses).clone()
    }

    pub fn responses_for(&self, invitation_id: Uuid) -> Vec<RsvpResponse> {
        lock(&self.responses)
            .iter()
            .filter(|r| r.record.invitation_id == invitation_id)
            .cloned()
            .collect()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GuestDirectory for InMemoryGuestDirectory {
    async fn search_guests_by_name(
        &self,
        search_term: &str,
    ) -> Result<Vec<GuestSearchResult>, DirectoryError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.search_unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable(
                "simulated outage".to_string(),
            ));
        }

        let term = search_term.trim().to_lowercase();
        let mut results: Vec<GuestSearchResult> = lock(&self.invitations)
            .iter()
            .filter_map(|invitation| {
                let score = invitation
                    .guests
                    .iter()
                    .flat_map(|g| {
                        [
                            g.first_name.to_lowercase(),
                            g.last_name.to_lowercase(),
                            g.full_name().to_lowercase(),
                        ]
                    })
                    .map(|candidate| name_similarity(&term, &candidate))
                    .fold(0.0_f32, f32::max);
                (score >= MIN_SIMILARITY).then(|| GuestSearchResult {
                    invitation: invitation.clone(),
                    similarity_score: score,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity_score
                .total_cmp(&a.similarity_score)
                .then_with(|| a.invitation.display_name().cmp(&b.invitation.display_name()))
        });
        results.truncate(MAX_SEARCH_RESULTS);
        Ok(results)
    }

    async fn insert_rsvp(&self, record: NewRsvpResponse) -> Result<RsvpResponse, DirectoryError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *lock(&self.insert_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if lock(&self.failing_positions).contains(&record.guest_position) {
            return Err(DirectoryError::Unavailable(format!(
                "simulated insert failure for guest {}",
                record.guest_position
            )));
        }

        let mut responses = lock(&self.responses);
        if let Some(existing) = responses.iter().find(|r| {
            r.record.invitation_id == record.invitation_id
                && r.record.guest_position == record.guest_position
                && r.record.submission_id == record.submission_id
        }) {
            return Ok(existing.clone());
        }

        let response = RsvpResponse {
            id: Uuid::new_v4(),
            record,
            created_at: Utc::now(),
        };
        responses.push(response.clone());
        Ok(response)
    }

    async fn ping(&self) -> bool {
        !self.search_unavailable.load(Ordering::SeqCst)
    }
}

/// Minimum score for a candidate to be returned.
const MIN_SIMILARITY: f32 = 0.3;

/// Approximate name similarity in `[0, 1]`.
///
/// Exact matches rank highest, then prefixes, then substrings, then
/// trigram overlap in the manner of `pg_trgm`.
fn name_similarity(term: &str, candidate: &str) -> f32 {
    if term.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    if term == candidate {
        return 1.0;
    }
    if candidate.starts_with(term) {
        return 0.8;
    }
    if candidate.contains(term) {
        return 0.6;
    }
    trigram_similarity(term, candidate).min(0.59)
}

fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let padded: Vec<char> = format!("  {} ", text).chars().collect();
    padded.windows(3).map(|w| [w[0], w[1], w[2]]).collect()
}

fn trigram_similarity(a: &str, b: &str) -> f32 {
    let left = trigrams(a);
    let right = trigrams(b);
    let shared = left.intersection(&right).count();
    let total = left.union(&right).count();
    if total == 0 {
        0.0
    } else {
        shared as f32 / total as f32
    }
}
