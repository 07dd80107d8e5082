//! RSVP submission.
//!
//! One response row per named guest is written concurrently. The batch
//! succeeds only if every insert succeeds. Once it has, the notifier runs
//! as a detached task whose outcome is only logged.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use shared::validation::non_blank;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::analytics::AnalyticsEvent;
use super::directory::GuestDirectory;
use super::notification::{NotificationResult, RsvpNotification, RsvpNotifier};
use crate::models::{Invitation, NewRsvpResponse, RsvpAnswers, RsvpResponse};

/// Message shown to the guest for any submission failure.
pub const SUBMISSION_ERROR_MESSAGE: &str =
    "An error occurred while submitting your RSVP. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{written} of {total} responses written, guests {failed:?} failed: {reason}")]
    Incomplete {
        written: usize,
        total: usize,
        failed: Vec<u8>,
        reason: String,
    },

    #[error("Timed out writing responses")]
    Timeout,
}

impl SubmissionError {
    pub fn user_message(&self) -> &'static str {
        SUBMISSION_ERROR_MESSAGE
    }
}

/// Builds one response record per named guest.
///
/// Attendance for an event the invitation does not include is `None`,
/// never `Some(false)`.
pub fn build_responses(
    invitation: &Invitation,
    answers: &RsvpAnswers,
    submission_id: Uuid,
) -> Vec<NewRsvpResponse> {
    let email = answers.email.trim().to_string();
    answers
        .guests
        .iter()
        .map(|guest| NewRsvpResponse {
            invitation_id: invitation.id,
            guest_position: guest.position,
            guest_first_name: guest.first_name.clone(),
            guest_last_name: guest.last_name.clone(),
            email: email.clone(),
            attending: guest.ceremony_reception.unwrap_or(false),
            welcome_party_attending: invitation
                .is_welcome_party_invited
                .then_some(guest.welcome_party.unwrap_or(false)),
            rehearsal_dinner_attending: invitation
                .is_rehearsal_dinner_invited
                .then_some(guest.rehearsal_dinner.unwrap_or(false)),
            dietary_restrictions: non_blank(&guest.dietary_restrictions),
            message: non_blank(&guest.message),
            submission_id,
        })
        .collect()
}

/// Whether any guest is attending any applicable event.
pub fn attending_any(responses: &[NewRsvpResponse]) -> bool {
    responses.iter().any(NewRsvpResponse::attending_any)
}

/// Outcome of a successful submission.
#[derive(Debug)]
pub struct SubmissionReceipt {
    pub responses: Vec<RsvpResponse>,
    pub submitted: RsvpNotification,
    /// Handle of the detached notification task. Dropping it does not
    /// cancel the task.
    pub notification: JoinHandle<NotificationResult>,
}

impl SubmissionReceipt {
    pub fn attending_any(&self) -> bool {
        self.submitted.attending_any
    }
}

#[derive(Clone)]
pub struct RsvpSubmitter {
    directory: Arc<dyn GuestDirectory>,
    notifier: Arc<dyn RsvpNotifier>,
    directory_timeout: Duration,
    notification_timeout: Duration,
}

impl RsvpSubmitter {
    pub fn new(
        directory: Arc<dyn GuestDirectory>,
        notifier: Arc<dyn RsvpNotifier>,
        directory_timeout: Duration,
        notification_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            notifier,
            directory_timeout,
            notification_timeout,
        }
    }

    /// Writes every guest's response, then dispatches the notification.
    pub async fn submit(
        &self,
        invitation: &Invitation,
        answers: &RsvpAnswers,
        submission_id: Uuid,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let records = build_responses(invitation, answers, submission_id);
        let total = records.len();

        let inserts = records.iter().cloned().map(|record| {
            let directory = Arc::clone(&self.directory);
            async move {
                let position = record.guest_position;
                (position, directory.insert_rsvp(record).await)
            }
        });

        let outcomes = match tokio::time::timeout(self.directory_timeout, join_all(inserts)).await {
            Ok(outcomes) => outcomes,
            Err(_) => {
                tracing::error!(
                    invitation_id = %invitation.id,
                    submission_id = %submission_id,
                    "Timed out writing RSVP responses"
                );
                self.record_failure(invitation, "timeout");
                return Err(SubmissionError::Timeout);
            }
        };

        let mut responses = Vec::with_capacity(total);
        let mut failed = Vec::new();
        let mut reason = String::new();
        for (position, outcome) in outcomes {
            match outcome {
                Ok(response) => responses.push(response),
                Err(e) => {
                    if reason.is_empty() {
                        reason = e.to_string();
                    }
                    failed.push(position);
                }
            }
        }

        if !failed.is_empty() {
            let error = SubmissionError::Incomplete {
                written: responses.len(),
                total,
                failed,
                reason,
            };
            tracing::error!(
                invitation_id = %invitation.id,
                submission_id = %submission_id,
                error = %error,
                "RSVP submission incomplete"
            );
            self.record_failure(invitation, &error.to_string());
            return Err(error);
        }

        let submitted = RsvpNotification {
            invitation: invitation.clone(),
            attending_any: attending_any(&records),
            guest_responses: records,
            email: answers.email.trim().to_string(),
            guest_counts: answers.guest_counts.clone(),
            submitted_at: Utc::now(),
        };

        AnalyticsEvent::Submitted {
            invitation_id: invitation.id,
            party_size: invitation.party_size,
            attending: submitted.attending_any,
        }
        .record();

        let notification = self.dispatch_notification(submitted.clone());

        Ok(SubmissionReceipt {
            responses,
            submitted,
            notification,
        })
    }

    fn record_failure(&self, invitation: &Invitation, reason: &str) {
        AnalyticsEvent::Error {
            invitation_id: invitation.id,
            reason: reason.to_string(),
        }
        .record();
    }

    fn dispatch_notification(&self, submitted: RsvpNotification) -> JoinHandle<NotificationResult> {
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.notification_timeout;
        let invitation_id = submitted.invitation.id;

        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, notifier.notify(submitted)).await {
                Ok(result) => result,
                Err(_) => NotificationResult::Failed("notification timed out".to_string()),
            };
            match &result {
                NotificationResult::Sent => {
                    tracing::info!(invitation_id = %invitation_id, "RSVP notification sent");
                }
                NotificationResult::Skipped => {
                    tracing::debug!(invitation_id = %invitation_id, "RSVP notification skipped");
                }
                NotificationResult::Failed(reason) => {
                    tracing::warn!(
                        invitation_id = %invitation_id,
                        reason = %reason,
                        "RSVP notification failed"
                    );
                }
            }
            result
        })
    }
}
