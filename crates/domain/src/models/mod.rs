//! Domain models for the RSVP workflow.

pub mod answers;
pub mod event;
pub mod invitation;
pub mod rsvp;

pub use answers::{AnswersError, AnswersPatch, GuestAnswers, GuestAnswersPatch, GuestCounts, RsvpAnswers};
pub use event::{EventCatalog, EventDetails, SubEvent};
pub use invitation::{GuestName, GuestSearchResult, Invitation, InvitationError, MAX_GUESTS};
pub use rsvp::{NewRsvpResponse, RsvpResponse};
