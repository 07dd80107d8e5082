//! Shared utilities for the wedding RSVP backend.
//!
//! This crate provides validation logic used by the domain, persistence
//! and API layers: contact details, free-text limits and search-term
//! normalisation.

pub mod validation;
