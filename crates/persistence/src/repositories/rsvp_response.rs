//! RSVP response repository for database operations.

use domain::models::NewRsvpResponse;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::RsvpResponseEntity;
use crate::metrics::QueryTimer;

/// Repository for RSVP responses. Rows are append-only.
#[derive(Clone)]
pub struct RsvpResponseRepository {
    pool: PgPool,
}

impl RsvpResponseRepository {
    /// Creates a new RsvpResponseRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert one guest's response.
    ///
    /// A repeated (invitation, guest position, submission) returns the row
    /// stored the first time instead of adding a duplicate.
    pub async fn insert(&self, record: &NewRsvpResponse) -> Result<RsvpResponseEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_rsvp_response");
        let result = sqlx::query_as::<_, RsvpResponseEntity>(
            r#"
            INSERT INTO rsvp_responses (
                invitation_id, guest_position, guest_first_name, guest_last_name, email,
                attending, welcome_party_attending, rehearsal_dinner_attending,
                dietary_restrictions, message, submission_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (invitation_id, guest_position, submission_id) DO UPDATE SET
                submission_id = rsvp_responses.submission_id
            RETURNING id, invitation_id, guest_position, guest_first_name, guest_last_name,
                      email, attending, welcome_party_attending, rehearsal_dinner_attending,
                      dietary_restrictions, message, submission_id, created_at
            "#,
        )
        .bind(record.invitation_id)
        .bind(record.guest_position as i16)
        .bind(&record.guest_first_name)
        .bind(&record.guest_last_name)
        .bind(&record.email)
        .bind(record.attending)
        .bind(record.welcome_party_attending)
        .bind(record.rehearsal_dinner_attending)
        .bind(&record.dietary_restrictions)
        .bind(&record.message)
        .bind(record.submission_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// All responses for an invitation, newest first.
    pub async fn list_for_invitation(
        &self,
        invitation_id: Uuid,
    ) -> Result<Vec<RsvpResponseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_rsvp_responses");
        let result = sqlx::query_as::<_, RsvpResponseEntity>(
            r#"
            SELECT id, invitation_id, guest_position, guest_first_name, guest_last_name,
                   email, attending, welcome_party_attending, rehearsal_dinner_attending,
                   dietary_restrictions, message, submission_id, created_at
            FROM rsvp_responses
            WHERE invitation_id = $1
            ORDER BY created_at DESC, guest_position
            "#,
        )
        .bind(invitation_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }
}
