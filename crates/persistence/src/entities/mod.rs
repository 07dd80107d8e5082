//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod invitation;
pub mod rsvp_response;

pub use invitation::{GuestSearchRowEntity, InvitationEntity};
pub use rsvp_response::RsvpResponseEntity;
