//! Multi-step RSVP form.
//!
//! A cursor over the step plan of one invitation. Moving forward validates
//! only the current step; moving back never validates. The final `advance`
//! hands over to submission instead of moving the cursor.

use std::sync::{Arc, Weak};

use serde::Serialize;
use uuid::Uuid;

use super::analytics::AnalyticsEvent;
use super::step_plan::{build_steps, Step, StepKind};
use super::validation::{FieldError, StepRules};
use crate::models::{AnswersError, AnswersPatch, EventCatalog, Invitation, RsvpAnswers};

/// Result of a successful `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to this step index.
    Moved(usize),
    /// The last step passed validation; submit now.
    ReadyToSubmit,
}

/// Result of `retreat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat {
    Moved(usize),
    /// Previous from the first step leaves the wizard.
    ExitToLookup,
}

#[derive(Debug, Clone)]
pub struct RsvpWizard {
    invitation: Invitation,
    steps: Vec<Step>,
    rules: StepRules,
    current_step: usize,
    in_flight: Weak<()>,
    attempted: bool,
    error: Option<String>,
    field_errors: Vec<FieldError>,
    answers: RsvpAnswers,
    submission_id: Uuid,
}

impl RsvpWizard {
    /// Opens the wizard at step 0 with default answers.
    ///
    /// A new submission id is minted for every wizard instance.
    pub fn new(invitation: Invitation, catalog: &EventCatalog, max_text_length: usize) -> Self {
        let steps = build_steps(&invitation, catalog);
        let rules = StepRules::build(&invitation, &steps, max_text_length);
        let answers = RsvpAnswers::defaults_for(&invitation);

        AnalyticsEvent::Started {
            invitation_id: invitation.id,
        }
        .record();

        Self {
            invitation,
            steps,
            rules,
            current_step: 0,
            in_flight: Weak::new(),
            attempted: false,
            error: None,
            field_errors: Vec::new(),
            answers,
            submission_id: Uuid::new_v4(),
        }
    }

    pub fn invitation(&self) -> &Invitation {
        &self.invitation
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current_kind(&self) -> StepKind {
        // The plan always ends with the contact step, so it is never empty.
        self.steps
            .get(self.current_step)
            .map(|s| s.kind)
            .unwrap_or(StepKind::ContactDetails)
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 >= self.steps.len()
    }

    pub fn answers(&self) -> &RsvpAnswers {
        &self.answers
    }

    pub fn submission_id(&self) -> Uuid {
        self.submission_id
    }

    /// True while the token handed out by `begin_submit` is alive.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.strong_count() > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Merges answer edits. Rejected edits leave the answers untouched.
    ///
    /// Changing answers after a failed attempt mints a new submission id,
    /// so the next attempt writes every guest row with the edited answers
    /// instead of only filling the rows the failed attempt missed.
    pub fn apply(&mut self, patch: AnswersPatch) -> Result<(), AnswersError> {
        let before = self.attempted.then(|| self.answers.clone());
        self.answers.apply(&self.invitation, patch)?;

        if before.is_some_and(|before| before != self.answers) {
            let previous = std::mem::replace(&mut self.submission_id, Uuid::new_v4());
            self.attempted = false;
            tracing::debug!(
                invitation_id = %self.invitation.id,
                previous_submission_id = %previous,
                submission_id = %self.submission_id,
                "Answers edited after failed submission, new submission id minted"
            );
        }
        Ok(())
    }

    /// Validates the current step and moves forward.
    ///
    /// On the last step every step is re-validated, since earlier answers
    /// may have been edited after their step was passed.
    pub fn advance(&mut self) -> Result<Advance, Vec<FieldError>> {
        let result = if self.is_last_step() {
            self.rules.validate_all(&self.steps, &self.answers)
        } else {
            self.rules.validate_step(self.current_kind(), &self.answers)
        };

        if let Err(errors) = result {
            tracing::debug!(
                invitation_id = %self.invitation.id,
                step = self.current_step,
                errors = errors.len(),
                "Step validation failed"
            );
            self.field_errors = errors.clone();
            return Err(errors);
        }

        self.field_errors.clear();
        if self.is_last_step() {
            return Ok(Advance::ReadyToSubmit);
        }

        self.current_step += 1;
        self.error = None;
        AnalyticsEvent::StepCompleted {
            invitation_id: self.invitation.id,
            step: self.current_step,
        }
        .record();
        Ok(Advance::Moved(self.current_step))
    }

    /// Moves back one step without validating.
    pub fn retreat(&mut self) -> Retreat {
        self.field_errors.clear();
        self.error = None;
        if self.current_step == 0 {
            Retreat::ExitToLookup
        } else {
            self.current_step -= 1;
            Retreat::Moved(self.current_step)
        }
    }

    /// Marks a submission in flight for as long as the returned token lives.
    ///
    /// Dropping the token without reporting an outcome (the submitting
    /// future was cancelled) releases the wizard again.
    #[must_use = "the wizard stops submitting once the token is dropped"]
    pub fn begin_submit(&mut self) -> Arc<()> {
        let token = Arc::new(());
        self.in_flight = Arc::downgrade(&token);
        self.attempted = true;
        self.error = None;
        token
    }

    /// Records a failed submission. The cursor stays on the last step and
    /// the answers are kept for a retry.
    pub fn submit_failed(&mut self, message: impl Into<String>) {
        self.in_flight = Weak::new();
        self.error = Some(message.into());
    }

    pub fn submit_succeeded(&mut self) {
        self.in_flight = Weak::new();
        self.attempted = false;
        self.error = None;
    }

    pub fn view(&self) -> WizardView<'_> {
        WizardView {
            invitation: &self.invitation,
            steps: &self.steps,
            current_step: self.current_step,
            current_kind: self.current_kind(),
            is_last_step: self.is_last_step(),
            submitting: self.is_submitting(),
            error: self.error.as_deref(),
            field_errors: &self.field_errors,
            answers: &self.answers,
        }
    }
}

/// Serializable snapshot of the wizard.
#[derive(Debug, Serialize)]
pub struct WizardView<'a> {
    pub invitation: &'a Invitation,
    pub steps: &'a [Step],
    pub current_step: usize,
    pub current_kind: StepKind,
    pub is_last_step: bool,
    pub submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    pub field_errors: &'a [FieldError],
    pub answers: &'a RsvpAnswers,
}
