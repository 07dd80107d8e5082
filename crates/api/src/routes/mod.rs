//! HTTP route handlers.

pub mod guests;
pub mod health;
pub mod rsvp_sessions;
