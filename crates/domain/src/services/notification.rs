//! RSVP notification seam.
//!
//! After the responses are written, the notifier is told about the
//! submission. Delivery is best-effort: the outcome is only logged.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{GuestCounts, Invitation, NewRsvpResponse, SubEvent};

/// Attendance summary for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTally {
    pub event: SubEvent,
    pub attending: usize,
    pub total: usize,
    /// Party-level head count claimed in the wizard, when anyone attends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_count: Option<u32>,
}

impl EventTally {
    pub fn label(&self) -> &'static str {
        match self.event {
            SubEvent::CeremonyReception => "Ceremony & Reception",
            SubEvent::WelcomeParty => "Welcome Party",
            SubEvent::RehearsalDinner => "Rehearsal Dinner",
        }
    }

    /// e.g. "Welcome Party: 1 of 2 guest(s)" or "Welcome Party: No one attending".
    pub fn summary(&self) -> String {
        if self.attending > 0 {
            format!("{}: {} of {} guest(s)", self.label(), self.attending, self.total)
        } else {
            format!("{}: No one attending", self.label())
        }
    }
}

/// Everything the notifier needs about one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpNotification {
    pub invitation: Invitation,
    pub guest_responses: Vec<NewRsvpResponse>,
    pub email: String,
    pub guest_counts: GuestCounts,
    pub attending_any: bool,
    pub submitted_at: DateTime<Utc>,
}

impl RsvpNotification {
    /// Guest names joined for subjects, e.g. "Jane Smith & John Smith".
    pub fn guest_names(&self) -> String {
        self.invitation.display_name()
    }

    fn attending(&self, event: SubEvent) -> usize {
        self.guest_responses
            .iter()
            .filter(|r| match event {
                SubEvent::CeremonyReception => r.attending,
                SubEvent::WelcomeParty => r.welcome_party_attending == Some(true),
                SubEvent::RehearsalDinner => r.rehearsal_dinner_attending == Some(true),
            })
            .count()
    }

    /// Tallies for the invited events: ceremony first, then welcome party,
    /// then rehearsal dinner.
    pub fn event_tallies(&self) -> Vec<EventTally> {
        [
            SubEvent::CeremonyReception,
            SubEvent::WelcomeParty,
            SubEvent::RehearsalDinner,
        ]
        .into_iter()
        .filter(|event| self.invitation.is_invited_to(*event))
        .map(|event| {
            let attending = self.attending(event);
            EventTally {
                event,
                attending,
                total: self.guest_responses.len(),
                head_count: (attending > 0)
                    .then(|| self.guest_counts.get(event))
                    .flatten(),
            }
        })
        .collect()
    }

    /// Events at least one guest is attending, in chronological order.
    pub fn attended_events(&self) -> Vec<SubEvent> {
        SubEvent::ALL
            .into_iter()
            .filter(|event| self.attending(*event) > 0)
            .collect()
    }
}

/// Result of a notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    /// Notification was delivered.
    Sent,
    /// Delivery failed. Never surfaced to the guest.
    Failed(String),
    /// Notifications are disabled.
    Skipped,
}

#[async_trait::async_trait]
pub trait RsvpNotifier: Send + Sync {
    /// Deliver a notification for a submission that has been written.
    async fn notify(&self, notification: RsvpNotification) -> NotificationResult;
}

/// Notifier for development and testing.
///
/// Logs and records notifications instead of sending them.
#[derive(Debug, Default)]
pub struct MockRsvpNotifier {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Mutex<Vec<RsvpNotification>>,
}

impl MockRsvpNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Notifications received so far, including failed ones.
    pub fn notifications(&self) -> Vec<RsvpNotification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl RsvpNotifier for MockRsvpNotifier {
    async fn notify(&self, notification: RsvpNotification) -> NotificationResult {
        let invitation_id = notification.invitation.id;
        let responses = notification.guest_responses.len();
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);

        if self.simulate_failure {
            tracing::warn!(
                invitation_id = %invitation_id,
                "Mock notifier simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            invitation_id = %invitation_id,
            responses = responses,
            "Mock: Would send RSVP notification"
        );
        NotificationResult::Sent
    }
}
