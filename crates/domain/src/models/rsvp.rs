//! RSVP response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An individual guest's RSVP as written to the guest directory.
///
/// `welcome_party_attending` and `rehearsal_dinner_attending` are `None`
/// when the invitation did not include that event, which is distinct from
/// `Some(false)` (declined).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewRsvpResponse {
    pub invitation_id: Uuid,
    pub guest_position: u8,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub email: String,
    pub attending: bool,
    pub welcome_party_attending: Option<bool>,
    pub rehearsal_dinner_attending: Option<bool>,
    pub dietary_restrictions: Option<String>,
    pub message: Option<String>,
    /// Shared by every row of one submission attempt. Retries reuse it
    /// until the answers are edited.
    pub submission_id: Uuid,
}

impl NewRsvpResponse {
    /// Whether this guest is attending at least one event.
    ///
    /// Not-applicable (`None`) events never count toward attendance.
    pub fn attending_any(&self) -> bool {
        self.attending
            || self.welcome_party_attending.unwrap_or(false)
            || self.rehearsal_dinner_attending.unwrap_or(false)
    }

    pub fn guest_full_name(&self) -> String {
        format!("{} {}", self.guest_first_name, self.guest_last_name)
    }
}

/// A persisted RSVP response. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RsvpResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub record: NewRsvpResponse,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> NewRsvpResponse {
        NewRsvpResponse {
            invitation_id: Uuid::nil(),
            guest_position: 1,
            guest_first_name: "Jane".to_string(),
            guest_last_name: "Smith".to_string(),
            email: "jane@example.com".to_string(),
            attending: false,
            welcome_party_attending: None,
            rehearsal_dinner_attending: None,
            dietary_restrictions: None,
            message: None,
            submission_id: Uuid::nil(),
        }
    }

    #[test]
    fn test_attending_any_ignores_not_applicable() {
        let declined = response();
        assert!(!declined.attending_any());

        let welcome_only = NewRsvpResponse {
            welcome_party_attending: Some(true),
            ..response()
        };
        assert!(welcome_only.attending_any());

        let declined_everything = NewRsvpResponse {
            welcome_party_attending: Some(false),
            rehearsal_dinner_attending: Some(false),
            ..response()
        };
        assert!(!declined_everything.attending_any());
    }

    #[test]
    fn test_null_serializes_as_null() {
        let json = serde_json::to_value(response()).unwrap();
        assert!(json["welcome_party_attending"].is_null());
        assert_eq!(json["attending"], false);
    }
}
