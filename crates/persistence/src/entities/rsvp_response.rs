//! RSVP response entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{NewRsvpResponse, RsvpResponse};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the rsvp_responses table.
#[derive(Debug, Clone, FromRow)]
pub struct RsvpResponseEntity {
    pub id: Uuid,
    pub invitation_id: Uuid,
    pub guest_position: i16,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub email: String,
    pub attending: bool,
    pub welcome_party_attending: Option<bool>,
    pub rehearsal_dinner_attending: Option<bool>,
    pub dietary_restrictions: Option<String>,
    pub message: Option<String>,
    pub submission_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<RsvpResponseEntity> for RsvpResponse {
    fn from(entity: RsvpResponseEntity) -> Self {
        Self {
            id: entity.id,
            record: NewRsvpResponse {
                invitation_id: entity.invitation_id,
                guest_position: entity.guest_position.clamp(0, u8::MAX as i16) as u8,
                guest_first_name: entity.guest_first_name,
                guest_last_name: entity.guest_last_name,
                email: entity.email,
                attending: entity.attending,
                welcome_party_attending: entity.welcome_party_attending,
                rehearsal_dinner_attending: entity.rehearsal_dinner_attending,
                dietary_restrictions: entity.dietary_restrictions,
                message: entity.message,
                submission_id: entity.submission_id,
            },
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsvp_response_entity_to_domain() {
        let entity = RsvpResponseEntity {
            id: Uuid::new_v4(),
            invitation_id: Uuid::new_v4(),
            guest_position: 2,
            guest_first_name: "John".to_string(),
            guest_last_name: "Smith".to_string(),
            email: "smiths@example.com".to_string(),
            attending: true,
            welcome_party_attending: Some(false),
            rehearsal_dinner_attending: None,
            dietary_restrictions: Some("Vegetarian".to_string()),
            message: None,
            submission_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        let response: RsvpResponse = entity.clone().into();
        assert_eq!(response.id, entity.id);
        assert_eq!(response.record.guest_position, 2);
        assert_eq!(response.record.welcome_party_attending, Some(false));
        assert_eq!(response.record.rehearsal_dinner_attending, None);
        assert_eq!(response.record.submission_id, entity.submission_id);
    }
}
