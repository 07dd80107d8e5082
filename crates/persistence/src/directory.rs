//! PostgreSQL-backed guest directory.

use domain::models::{GuestSearchResult, Invitation, NewRsvpResponse, RsvpResponse};
use domain::services::{DirectoryError, GuestDirectory};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repositories::{InvitationRepository, RsvpResponseRepository};

fn to_directory_error(err: sqlx::Error) -> DirectoryError {
    match err {
        sqlx::Error::Database(db) => DirectoryError::Rejected(db.message().to_string()),
        sqlx::Error::PoolTimedOut => DirectoryError::Timeout,
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            DirectoryError::Corrupt(err.to_string())
        }
        other => DirectoryError::Unavailable(other.to_string()),
    }
}

/// Guest directory over the `invitations` and `rsvp_responses` tables.
#[derive(Clone)]
pub struct PgGuestDirectory {
    pool: PgPool,
    invitations: InvitationRepository,
    responses: RsvpResponseRepository,
}

impl PgGuestDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            invitations: InvitationRepository::new(pool.clone()),
            responses: RsvpResponseRepository::new(pool.clone()),
            pool,
        }
    }

    /// Find a single invitation by id.
    pub async fn find_invitation(&self, id: Uuid) -> Result<Option<Invitation>, DirectoryError> {
        let entity = self
            .invitations
            .find_by_id(id)
            .await
            .map_err(to_directory_error)?;
        entity
            .map(|e| {
                Invitation::try_from(e)
                    .map_err(|err| DirectoryError::Corrupt(format!("invitation {}: {}", id, err)))
            })
            .transpose()
    }

    /// Every response recorded for an invitation, newest first.
    pub async fn list_responses(&self, invitation_id: Uuid) -> Result<Vec<RsvpResponse>, DirectoryError> {
        let rows = self
            .responses
            .list_for_invitation(invitation_id)
            .await
            .map_err(to_directory_error)?;
        Ok(rows.into_iter().map(RsvpResponse::from).collect())
    }
}

#[async_trait::async_trait]
impl GuestDirectory for PgGuestDirectory {
    async fn search_guests_by_name(
        &self,
        search_term: &str,
    ) -> Result<Vec<GuestSearchResult>, DirectoryError> {
        let rows = self
            .invitations
            .search_by_name(search_term)
            .await
            .map_err(to_directory_error)?;

        let results = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.invitation.id;
                match GuestSearchResult::try_from(row) {
                    Ok(result) => Some(result),
                    Err(e) => {
                        tracing::error!(invitation_id = %id, error = %e, "Skipping malformed invitation row");
                        None
                    }
                }
            })
            .collect();
        Ok(results)
    }

    async fn insert_rsvp(&self, record: NewRsvpResponse) -> Result<RsvpResponse, DirectoryError> {
        let entity = self
            .responses
            .insert(&record)
            .await
            .map_err(to_directory_error)?;
        Ok(entity.into())
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
