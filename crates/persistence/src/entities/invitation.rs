//! Invitation entity (database row mapping).

use domain::models::{GuestName, GuestSearchResult, Invitation, InvitationError};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the invitations table.
///
/// Guest slots are flat columns; slot 1 is mandatory, slots 2-4 are
/// either fully present or fully absent.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub guest_1_first_name: String,
    pub guest_1_last_name: String,
    pub guest_2_first_name: Option<String>,
    pub guest_2_last_name: Option<String>,
    pub guest_3_first_name: Option<String>,
    pub guest_3_last_name: Option<String>,
    pub guest_4_first_name: Option<String>,
    pub guest_4_last_name: Option<String>,
    pub party_size: i32,
    pub is_welcome_party_invited: bool,
    pub is_rehearsal_dinner_invited: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Row returned by the `search_guests_by_name` function.
#[derive(Debug, Clone, FromRow)]
pub struct GuestSearchRowEntity {
    #[sqlx(flatten)]
    pub invitation: InvitationEntity,
    pub similarity_score: f32,
}

fn slot(
    position: u8,
    first: Option<String>,
    last: Option<String>,
) -> Result<Option<GuestName>, InvitationError> {
    let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
    match (blank(&first), blank(&last)) {
        (true, true) => Ok(None),
        (false, false) => Ok(Some(GuestName::new(
            position,
            first.unwrap_or_default().trim(),
            last.unwrap_or_default().trim(),
        ))),
        _ => Err(InvitationError::EmptyName(position)),
    }
}

impl TryFrom<InvitationEntity> for Invitation {
    type Error = InvitationError;

    fn try_from(entity: InvitationEntity) -> Result<Self, Self::Error> {
        let mut guests = vec![slot(
            1,
            Some(entity.guest_1_first_name),
            Some(entity.guest_1_last_name),
        )?
        .ok_or(InvitationError::EmptyName(1))?];
        for (position, first, last) in [
            (2, entity.guest_2_first_name, entity.guest_2_last_name),
            (3, entity.guest_3_first_name, entity.guest_3_last_name),
            (4, entity.guest_4_first_name, entity.guest_4_last_name),
        ] {
            if let Some(guest) = slot(position, first, last)? {
                guests.push(guest);
            }
        }

        Invitation::new(
            entity.id,
            guests,
            entity.party_size,
            entity.is_welcome_party_invited,
            entity.is_rehearsal_dinner_invited,
            entity.email.filter(|e| !e.trim().is_empty()),
            entity.phone.filter(|p| !p.trim().is_empty()),
        )
    }
}

impl TryFrom<GuestSearchRowEntity> for GuestSearchResult {
    type Error = InvitationError;

    fn try_from(row: GuestSearchRowEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            invitation: row.invitation.try_into()?,
            similarity_score: row.similarity_score,
        })
    }
}
