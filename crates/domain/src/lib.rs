//! Domain layer for the wedding RSVP backend.
//!
//! This crate contains:
//! - Domain models (Invitation, RSVP responses, events, answers)
//! - The RSVP workflow: guest lookup, step plan, multi-step wizard,
//!   submission and confirmation
//! - The seams to the guest directory and the notifier

pub mod models;
pub mod services;
