//! Invitation repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GuestSearchRowEntity, InvitationEntity};
use crate::metrics::QueryTimer;

/// Repository for invitation lookups. Invitations are read-only here.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new InvitationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fuzzy name search, ranked by similarity score (highest first).
    pub async fn search_by_name(
        &self,
        search_term: &str,
    ) -> Result<Vec<GuestSearchRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_guests_by_name");
        let result = sqlx::query_as::<_, GuestSearchRowEntity>(
            r#"
            SELECT id,
                   guest_1_first_name, guest_1_last_name,
                   guest_2_first_name, guest_2_last_name,
                   guest_3_first_name, guest_3_last_name,
                   guest_4_first_name, guest_4_last_name,
                   party_size, is_welcome_party_invited, is_rehearsal_dinner_invited,
                   email, phone, similarity_score
            FROM search_guests_by_name($1)
            "#,
        )
        .bind(search_term)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        result
    }

    /// Find an invitation by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_id");
        let result = sqlx::query_as::<_, InvitationEntity>(
            r#"
            SELECT id,
                   guest_1_first_name, guest_1_last_name,
                   guest_2_first_name, guest_2_last_name,
                   guest_3_first_name, guest_3_last_name,
                   guest_4_first_name, guest_4_last_name,
                   party_size, is_welcome_party_invited, is_rehearsal_dinner_invited,
                   email, phone
            FROM invitations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        result
    }
}
