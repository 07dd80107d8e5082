//! Repository implementations for database operations.

pub mod invitation;
pub mod rsvp_response;

pub use invitation::InvitationRepository;
pub use rsvp_response::RsvpResponseRepository;
