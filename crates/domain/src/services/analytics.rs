//! Workflow analytics events.
//!
//! Each event increments a metrics counter and is logged as a structured
//! tracing event.

use metrics::counter;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    /// An invitation was selected and the wizard opened.
    Started { invitation_id: Uuid },
    /// A step passed validation and the cursor moved on. `step` is 1-based.
    StepCompleted { invitation_id: Uuid, step: usize },
    /// Every response row was written.
    Submitted {
        invitation_id: Uuid,
        party_size: i32,
        attending: bool,
    },
    /// Submission failed.
    Error { invitation_id: Uuid, reason: String },
}

impl AnalyticsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::Started { .. } => "rsvp_started",
            AnalyticsEvent::StepCompleted { .. } => "rsvp_step_completed",
            AnalyticsEvent::Submitted { .. } => "rsvp_submitted",
            AnalyticsEvent::Error { .. } => "rsvp_error",
        }
    }

    /// Label attached to the counter, e.g. `step_2` or `attending`.
    pub fn label(&self) -> String {
        match self {
            AnalyticsEvent::Started { .. } => "rsvp_form".to_string(),
            AnalyticsEvent::StepCompleted { step, .. } => format!("step_{}", step),
            AnalyticsEvent::Submitted { attending, .. } => {
                if *attending { "attending" } else { "not_attending" }.to_string()
            }
            AnalyticsEvent::Error { .. } => "submission".to_string(),
        }
    }

    /// Record the event.
    pub fn record(&self) {
        counter!(
            "rsvp_events_total",
            "event" => self.name(),
            "label" => self.label()
        )
        .increment(1);

        match self {
            AnalyticsEvent::Started { invitation_id } => {
                tracing::info!(event = self.name(), invitation_id = %invitation_id, "RSVP started");
            }
            AnalyticsEvent::StepCompleted { invitation_id, step } => {
                tracing::debug!(
                    event = self.name(),
                    invitation_id = %invitation_id,
                    step = step,
                    "RSVP step completed"
                );
            }
            AnalyticsEvent::Submitted {
                invitation_id,
                party_size,
                attending,
            } => {
                tracing::info!(
                    event = self.name(),
                    invitation_id = %invitation_id,
                    party_size = party_size,
                    attending = attending,
                    "RSVP submitted"
                );
            }
            AnalyticsEvent::Error {
                invitation_id,
                reason,
            } => {
                tracing::warn!(
                    event = self.name(),
                    invitation_id = %invitation_id,
                    reason = %reason,
                    "RSVP submission failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_and_labels() {
        let id = Uuid::nil();
        let step = AnalyticsEvent::StepCompleted {
            invitation_id: id,
            step: 2,
        };
        assert_eq!(step.name(), "rsvp_step_completed");
        assert_eq!(step.label(), "step_2");

        let submitted = AnalyticsEvent::Submitted {
            invitation_id: id,
            party_size: 2,
            attending: false,
        };
        assert_eq!(submitted.name(), "rsvp_submitted");
        assert_eq!(submitted.label(), "not_attending");
    }

    #[test]
    fn test_record_without_recorder() {
        AnalyticsEvent::Started {
            invitation_id: Uuid::nil(),
        }
        .record();
    }
}
