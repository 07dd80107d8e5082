//! Domain services for the RSVP workflow.
//!
//! Services contain the workflow logic that operates on domain models. The
//! guest directory and the notifier are the only external collaborators.

pub mod analytics;
pub mod calendar;
pub mod confirmation;
pub mod directory;
pub mod lookup;
pub mod notification;
pub mod step_plan;
pub mod submission;
pub mod validation;
pub mod wizard;
pub mod workflow;

pub use analytics::AnalyticsEvent;
pub use calendar::CalendarLinks;
pub use confirmation::{Confirmation, ConfirmationVariant, ConfirmedEvent};
pub use directory::{DirectoryError, GuestDirectory, InMemoryGuestDirectory, MAX_SEARCH_RESULTS};
pub use lookup::{GuestLookup, LookupError, LookupOutcome, NoMatchGuidance};
pub use notification::{
    EventTally, MockRsvpNotifier, NotificationResult, RsvpNotification, RsvpNotifier,
};
pub use step_plan::{build_steps, FormField, Step, StepKind, CONTACT_DETAILS_DESCRIPTION};
pub use submission::{
    attending_any, build_responses, RsvpSubmitter, SubmissionError, SubmissionReceipt,
    SUBMISSION_ERROR_MESSAGE,
};
pub use validation::{FieldError, StepRule, StepRules};
pub use wizard::{Advance, Retreat, RsvpWizard, WizardView};
pub use workflow::{
    NextOutcome, RsvpWorkflow, WorkflowError, WorkflowServices, WorkflowState, WorkflowView,
};
