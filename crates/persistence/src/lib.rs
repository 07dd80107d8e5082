//! Persistence layer for the wedding RSVP backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - The PostgreSQL guest directory

pub mod db;
pub mod directory;
pub mod entities;
pub mod metrics;
pub mod repositories;

pub use directory::PgGuestDirectory;
