//! Service integrations used by the HTTP layer.

pub mod email;
pub mod notifier;
pub mod sessions;

pub use email::{EmailError, EmailMessage, EmailService};
pub use notifier::EmailRsvpNotifier;
pub use sessions::{Session, SessionError, SessionStore};
