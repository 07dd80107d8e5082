//! RSVP workflow: `lookup -> form -> success`.
//!
//! One workflow instance drives a single guest session. It always starts at
//! lookup; the only way into the form is selecting a displayed candidate
//! and the only way into success is a completed submission.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::confirmation::Confirmation;
use super::lookup::{GuestLookup, LookupError, LookupOutcome};
use super::notification::RsvpNotification;
use super::submission::{RsvpSubmitter, SubmissionError};
use super::validation::FieldError;
use super::wizard::{Advance, Retreat, RsvpWizard, WizardView};
use crate::models::{AnswersError, AnswersPatch, EventCatalog};

/// Collaborators shared by every workflow instance.
#[derive(Clone)]
pub struct WorkflowServices {
    pub lookup: GuestLookup,
    pub submitter: RsvpSubmitter,
    pub catalog: Arc<EventCatalog>,
    pub max_text_length: usize,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Cannot {action} during {state}")]
    IllegalTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Invitation {0} is not one of the displayed results")]
    UnknownCandidate(Uuid),

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Please correct the highlighted fields")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Answers(#[from] AnswersError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[derive(Debug, Default)]
pub struct LookupState {
    search_term: Option<String>,
    outcome: Option<LookupOutcome>,
    error: Option<String>,
}

#[derive(Debug)]
pub struct SuccessState {
    submitted: RsvpNotification,
    confirmation: Confirmation,
}

#[derive(Debug)]
pub enum WorkflowState {
    Lookup(LookupState),
    Form(Box<RsvpWizard>),
    Success(Box<SuccessState>),
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Lookup(_) => "lookup",
            WorkflowState::Form(_) => "form",
            WorkflowState::Success(_) => "success",
        }
    }
}

/// Result of a successful `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutcome {
    Moved(usize),
    Submitted { attending_any: bool },
}

#[derive(Debug)]
pub struct RsvpWorkflow {
    state: WorkflowState,
}

impl Default for RsvpWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl RsvpWorkflow {
    /// A workflow at lookup with nothing searched yet.
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Lookup(LookupState::default()),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    fn illegal(&self, action: &'static str) -> WorkflowError {
        WorkflowError::IllegalTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Runs a name search. Only allowed at lookup.
    pub async fn search(
        &mut self,
        services: &WorkflowServices,
        raw_term: &str,
    ) -> Result<LookupOutcome, WorkflowError> {
        let WorkflowState::Lookup(lookup) = &mut self.state else {
            return Err(self.illegal("search"));
        };

        lookup.search_term = Some(raw_term.trim().to_string());
        match services.lookup.search(raw_term).await {
            Ok(outcome) => {
                lookup.error = None;
                lookup.outcome = Some(outcome.clone());
                Ok(outcome)
            }
            Err(e) => {
                lookup.outcome = None;
                lookup.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Selects one of the displayed candidates and opens a fresh wizard.
    pub fn select(&mut self, services: &WorkflowServices, invitation_id: Uuid) -> Result<(), WorkflowError> {
        let WorkflowState::Lookup(lookup) = &self.state else {
            return Err(self.illegal("select an invitation"));
        };

        let invitation = lookup
            .outcome
            .as_ref()
            .map(LookupOutcome::candidates)
            .unwrap_or_default()
            .iter()
            .find(|c| c.invitation.id == invitation_id)
            .map(|c| c.invitation.clone())
            .ok_or(WorkflowError::UnknownCandidate(invitation_id))?;

        tracing::info!(invitation_id = %invitation_id, "Invitation selected");
        let wizard = RsvpWizard::new(invitation, &services.catalog, services.max_text_length);
        self.state = WorkflowState::Form(Box::new(wizard));
        Ok(())
    }

    pub fn update_answers(&mut self, patch: AnswersPatch) -> Result<(), WorkflowError> {
        let WorkflowState::Form(wizard) = &mut self.state else {
            return Err(self.illegal("edit answers"));
        };
        if wizard.is_submitting() {
            return Err(WorkflowError::SubmissionInProgress);
        }
        wizard.apply(patch)?;
        Ok(())
    }

    /// Validates the current step and moves on, submitting from the last step.
    pub async fn next(&mut self, services: &WorkflowServices) -> Result<NextOutcome, WorkflowError> {
        let WorkflowState::Form(wizard) = &mut self.state else {
            return Err(self.illegal("continue"));
        };
        if wizard.is_submitting() {
            return Err(WorkflowError::SubmissionInProgress);
        }

        match wizard.advance().map_err(WorkflowError::Validation)? {
            Advance::Moved(step) => return Ok(NextOutcome::Moved(step)),
            Advance::ReadyToSubmit => {}
        }

        // Held across the await; if this future is dropped the wizard is
        // released instead of staying marked as submitting.
        let _in_flight = wizard.begin_submit();
        let result = services
            .submitter
            .submit(wizard.invitation(), wizard.answers(), wizard.submission_id())
            .await;

        match result {
            Ok(receipt) => {
                wizard.submit_succeeded();
                let attending_any = receipt.attending_any();
                let confirmation = Confirmation::render(Some(&receipt.submitted), &services.catalog);
                if let Some(confirmation) = confirmation {
                    self.state = WorkflowState::Success(Box::new(SuccessState {
                        submitted: receipt.submitted,
                        confirmation,
                    }));
                }
                Ok(NextOutcome::Submitted { attending_any })
            }
            Err(e) => {
                wizard.submit_failed(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Steps back; from the first step, returns to lookup and discards the
    /// wizard's answers.
    pub fn previous(&mut self) -> Result<(), WorkflowError> {
        let WorkflowState::Form(wizard) = &mut self.state else {
            return Err(self.illegal("go back"));
        };
        if wizard.is_submitting() {
            return Err(WorkflowError::SubmissionInProgress);
        }
        if wizard.retreat() == Retreat::ExitToLookup {
            tracing::debug!(invitation_id = %wizard.invitation().id, "Wizard exited to lookup");
            self.state = WorkflowState::Lookup(LookupState::default());
        }
        Ok(())
    }

    /// "Submit another RSVP": back to lookup with everything cleared.
    pub fn restart(&mut self) -> Result<(), WorkflowError> {
        if let WorkflowState::Form(wizard) = &self.state {
            if wizard.is_submitting() {
                return Err(WorkflowError::SubmissionInProgress);
            }
        }
        self.state = WorkflowState::Lookup(LookupState::default());
        Ok(())
    }

    pub fn wizard(&self) -> Option<&RsvpWizard> {
        match &self.state {
            WorkflowState::Form(wizard) => Some(wizard),
            _ => None,
        }
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        match &self.state {
            WorkflowState::Success(success) => Some(&success.confirmation),
            _ => None,
        }
    }

    pub fn submitted(&self) -> Option<&RsvpNotification> {
        match &self.state {
            WorkflowState::Success(success) => Some(&success.submitted),
            _ => None,
        }
    }

    pub fn view(&self) -> WorkflowView<'_> {
        match &self.state {
            WorkflowState::Lookup(lookup) => WorkflowView::Lookup {
                search_term: lookup.search_term.as_deref(),
                outcome: lookup.outcome.as_ref(),
                error: lookup.error.as_deref(),
            },
            WorkflowState::Form(wizard) => WorkflowView::Form {
                form: wizard.view(),
            },
            WorkflowState::Success(success) => WorkflowView::Success {
                confirmation: &success.confirmation,
            },
        }
    }
}

/// Serializable snapshot of the workflow.
#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowView<'a> {
    Lookup {
        #[serde(skip_serializing_if = "Option::is_none")]
        search_term: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        outcome: Option<&'a LookupOutcome>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<&'a str>,
    },
    Form {
        form: WizardView<'a>,
    },
    Success {
        confirmation: &'a Confirmation,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuestAnswersPatch, GuestName, Invitation};
    use crate::services::directory::InMemoryGuestDirectory;
    use crate::services::notification::MockRsvpNotifier;
    use crate::services::step_plan::StepKind;
    use std::time::Duration;

    struct Fixture {
        directory: Arc<InMemoryGuestDirectory>,
        notifier: Arc<MockRsvpNotifier>,
        services: WorkflowServices,
    }

    fn smith(first: &str, second: &str, welcome: bool, rehearsal: bool) -> Invitation {
        Invitation::new(
            Uuid::new_v4(),
            vec![
                GuestName::new(1, first, "Smith"),
                GuestName::new(2, second, "Smith"),
            ],
            2,
            welcome,
            rehearsal,
            Some(format!("{}@example.com", first.to_lowercase())),
            None,
        )
        .unwrap()
    }

    fn fixture(invitations: Vec<Invitation>) -> Fixture {
        let directory = Arc::new(InMemoryGuestDirectory::with_invitations(invitations));
        let notifier = Arc::new(MockRsvpNotifier::new());
        let services = WorkflowServices {
            lookup: GuestLookup::new(directory.clone(), Duration::from_secs(1)),
            submitter: RsvpSubmitter::new(
                directory.clone(),
                notifier.clone(),
                Duration::from_secs(1),
                Duration::from_secs(1),
            ),
            catalog: Arc::new(EventCatalog::default()),
            max_text_length: 500,
        };
        Fixture {
            directory,
            notifier,
            services,
        }
    }

    async fn wait_for_notifications(notifier: &MockRsvpNotifier, expected: usize) {
        for _ in 0..100 {
            if notifier.notifications().len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_select_second_of_two_smiths() {
        let first = smith("Jane", "John", false, false);
        let second = smith("Alice", "Bob", true, false);
        let f = fixture(vec![first.clone(), second.clone()]);
        let mut workflow = RsvpWorkflow::new();

        let outcome = workflow.search(&f.services, "Smith").await.unwrap();
        assert_eq!(outcome.candidates().len(), 2);

        workflow.select(&f.services, second.id).unwrap();
        let wizard = workflow.wizard().unwrap();
        assert_eq!(wizard.invitation().id, second.id);
        let names: Vec<&str> = wizard
            .answers()
            .guests
            .iter()
            .map(|g| g.first_name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(wizard.current_kind(), StepKind::WelcomeParty);
    }

    #[tokio::test]
    async fn test_select_requires_displayed_candidate() {
        let f = fixture(vec![smith("Jane", "John", false, false)]);
        let mut workflow = RsvpWorkflow::new();
        let unknown = Uuid::new_v4();

        assert!(matches!(
            workflow.select(&f.services, unknown),
            Err(WorkflowError::UnknownCandidate(id)) if id == unknown
        ));
        assert_eq!(workflow.state().name(), "lookup");
    }

    #[tokio::test]
    async fn test_blank_search_is_validation_error() {
        let f = fixture(vec![smith("Jane", "John", false, false)]);
        let mut workflow = RsvpWorkflow::new();

        let err = workflow.search(&f.services, "   ").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Lookup(LookupError::InvalidTerm(_))));
        assert_eq!(f.directory.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_illegal_transitions() {
        let f = fixture(vec![]);
        let mut workflow = RsvpWorkflow::new();

        assert!(matches!(
            workflow.next(&f.services).await,
            Err(WorkflowError::IllegalTransition { state: "lookup", .. })
        ));
        assert!(matches!(
            workflow.previous(),
            Err(WorkflowError::IllegalTransition { .. })
        ));
        assert!(matches!(
            workflow.update_answers(AnswersPatch::default()),
            Err(WorkflowError::IllegalTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_full_submission_with_mixed_welcome_party() {
        let invitation = smith("Jane", "John", true, false);
        let f = fixture(vec![invitation.clone()]);
        let mut workflow = RsvpWorkflow::new();

        workflow.search(&f.services, "Jane").await.unwrap();
        workflow.select(&f.services, invitation.id).unwrap();
        workflow
            .update_answers(AnswersPatch {
                guests: vec![GuestAnswersPatch {
                    position: 2,
                    welcome_party: Some(false),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(workflow.next(&f.services).await.unwrap(), NextOutcome::Moved(1));
        assert_eq!(workflow.next(&f.services).await.unwrap(), NextOutcome::Moved(2));
        assert_eq!(
            workflow.next(&f.services).await.unwrap(),
            NextOutcome::Submitted { attending_any: true }
        );
        assert_eq!(workflow.state().name(), "success");

        let rows = f.directory.responses_for(invitation.id);
        assert_eq!(rows.len(), 2);
        let welcome: Vec<Option<bool>> = {
            let mut rows = rows.clone();
            rows.sort_by_key(|r| r.record.guest_position);
            rows.iter().map(|r| r.record.welcome_party_attending).collect()
        };
        assert_eq!(welcome, vec![Some(true), Some(false)]);
        assert!(rows.iter().all(|r| r.record.rehearsal_dinner_attending.is_none()));

        wait_for_notifications(&f.notifier, 1).await;
        let sent = f.notifier.notifications();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].guest_responses.len(), 2);

        let confirmation = workflow.confirmation().unwrap();
        assert_eq!(confirmation.headline, "Thank You for Your RSVP!");
    }

    #[tokio::test]
    async fn test_failed_submission_stays_on_last_step() {
        let invitation = smith("Jane", "John", false, false);
        let f = fixture(vec![invitation.clone()]);
        f.directory.fail_inserts_for_position(2);
        let mut workflow = RsvpWorkflow::new();

        workflow.search(&f.services, "Smith").await.unwrap();
        workflow.select(&f.services, invitation.id).unwrap();
        workflow.next(&f.services).await.unwrap();

        let err = workflow.next(&f.services).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Submission(_)));
        let wizard = workflow.wizard().unwrap();
        assert_eq!(wizard.current_step(), 1);
        assert!(!wizard.is_submitting());
        assert_eq!(
            wizard.error(),
            Some("An error occurred while submitting your RSVP. Please try again.")
        );
        assert!(f.notifier.notifications().is_empty());

        f.directory.clear_insert_failures();
        assert!(matches!(
            workflow.next(&f.services).await.unwrap(),
            NextOutcome::Submitted { .. }
        ));
        assert_eq!(f.directory.responses_for(invitation.id).len(), 2);
    }

    #[tokio::test]
    async fn test_edit_after_failed_submission_rewrites_every_guest() {
        let invitation = smith("Jane", "John", false, false);
        let f = fixture(vec![invitation.clone()]);
        f.directory.fail_inserts_for_position(2);
        let mut workflow = RsvpWorkflow::new();

        workflow.search(&f.services, "Smith").await.unwrap();
        workflow.select(&f.services, invitation.id).unwrap();
        workflow.next(&f.services).await.unwrap();
        let first_id = workflow.wizard().unwrap().submission_id();
        assert!(workflow.next(&f.services).await.is_err());

        // Guest 1 was written as attending; now they decline.
        workflow
            .update_answers(AnswersPatch {
                guests: vec![GuestAnswersPatch {
                    position: 1,
                    ceremony_reception: Some(false),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .unwrap();
        let second_id = workflow.wizard().unwrap().submission_id();
        assert_ne!(second_id, first_id);

        f.directory.clear_insert_failures();
        workflow.next(&f.services).await.unwrap();

        let rows = f.directory.responses_for(invitation.id);
        let latest: Vec<_> = rows
            .iter()
            .filter(|r| r.record.submission_id == second_id)
            .collect();
        assert_eq!(latest.len(), 2);
        let guest_one = latest
            .iter()
            .find(|r| r.record.guest_position == 1)
            .unwrap();
        assert!(!guest_one.record.attending);

        wait_for_notifications(&f.notifier, 1).await;
        let sent = f.notifier.notifications();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].guest_responses[0].attending);

        let submitted = workflow.submitted().unwrap();
        assert_eq!(submitted.guest_responses[0].submission_id, second_id);
        assert!(!submitted.guest_responses[0].attending);
    }

    #[tokio::test]
    async fn test_cancelled_submission_releases_workflow() {
        let invitation = smith("Jane", "John", false, false);
        let f = fixture(vec![invitation.clone()]);
        let mut workflow = RsvpWorkflow::new();

        workflow.search(&f.services, "Smith").await.unwrap();
        workflow.select(&f.services, invitation.id).unwrap();
        workflow.next(&f.services).await.unwrap();

        f.directory.set_insert_delay(Some(Duration::from_millis(500)));
        let cancelled =
            tokio::time::timeout(Duration::from_millis(50), workflow.next(&f.services)).await;
        assert!(cancelled.is_err());

        let wizard = workflow.wizard().unwrap();
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.current_step(), 1);

        f.directory.set_insert_delay(None);
        workflow.previous().unwrap();
        assert_eq!(workflow.wizard().unwrap().current_step(), 0);
        workflow.next(&f.services).await.unwrap();
        assert!(matches!(
            workflow.next(&f.services).await.unwrap(),
            NextOutcome::Submitted { .. }
        ));
        assert_eq!(workflow.state().name(), "success");
    }

    #[tokio::test]
    async fn test_previous_from_first_step_exits_and_reselect_resets() {
        let invitation = smith("Jane", "John", true, false);
        let f = fixture(vec![invitation.clone()]);
        let mut workflow = RsvpWorkflow::new();

        workflow.search(&f.services, "Smith").await.unwrap();
        workflow.select(&f.services, invitation.id).unwrap();
        workflow
            .update_answers(AnswersPatch {
                email: Some("changed@example.com".to_string()),
                ..Default::default()
            })
            .unwrap();
        workflow.next(&f.services).await.unwrap();
        workflow.previous().unwrap();
        assert_eq!(workflow.wizard().unwrap().current_step(), 0);

        workflow.previous().unwrap();
        assert_eq!(workflow.state().name(), "lookup");

        workflow.search(&f.services, "Smith").await.unwrap();
        workflow.select(&f.services, invitation.id).unwrap();
        let wizard = workflow.wizard().unwrap();
        assert_eq!(wizard.current_step(), 0);
        assert_eq!(wizard.answers().email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_restart_from_success() {
        let invitation = smith("Jane", "John", false, false);
        let f = fixture(vec![invitation.clone()]);
        let mut workflow = RsvpWorkflow::new();

        workflow.search(&f.services, "Smith").await.unwrap();
        workflow.select(&f.services, invitation.id).unwrap();
        workflow.next(&f.services).await.unwrap();
        workflow.next(&f.services).await.unwrap();
        assert!(workflow.submitted().is_some());

        workflow.restart().unwrap();
        assert_eq!(workflow.state().name(), "lookup");
        let json = serde_json::to_value(workflow.view()).unwrap();
        assert_eq!(json["state"], "lookup");
        assert!(json.get("outcome").is_none());
    }
}
