//! Invitation domain models.
//!
//! An invitation (guest party record) names one to four guests and carries
//! the sub-event flags that shape the RSVP step plan.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::event::SubEvent;

/// Maximum number of named guests on a single invitation.
pub const MAX_GUESTS: usize = 4;

/// Errors raised when an invitation record is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvitationError {
    #[error("Invitation must name at least one guest")]
    NoGuests,

    #[error("Invitation names {0} guests, at most 4 are allowed")]
    TooManyGuests(usize),

    #[error("Guest position {0} is outside 1-4")]
    InvalidPosition(u8),

    #[error("Guest position {0} is used twice")]
    DuplicatePosition(u8),

    #[error("Guest at position {0} has an empty name")]
    EmptyName(u8),

    #[error("Party size {party_size} is smaller than the {named} named guests")]
    PartySizeTooSmall { party_size: i32, named: usize },
}

/// A single named guest on an invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestName {
    pub first_name: String,
    pub last_name: String,
    /// Fixed slot on the invitation (1-4).
    pub position: u8,
}

impl GuestName {
    pub fn new(position: u8, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            position,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A guest party record as stored in the guest directory.
///
/// Invitations are seeded out-of-band and are read-only to the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invitation {
    pub id: Uuid,
    /// Named guests ordered by position. Unused slots are absent.
    pub guests: Vec<GuestName>,
    pub party_size: i32,
    pub is_welcome_party_invited: bool,
    pub is_rehearsal_dinner_invited: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Invitation {
    /// Builds an invitation, enforcing the guest-slot invariants.
    ///
    /// Guests are sorted by position.
    pub fn new(
        id: Uuid,
        mut guests: Vec<GuestName>,
        party_size: i32,
        is_welcome_party_invited: bool,
        is_rehearsal_dinner_invited: bool,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<Self, InvitationError> {
        if guests.is_empty() {
            return Err(InvitationError::NoGuests);
        }
        if guests.len() > MAX_GUESTS {
            return Err(InvitationError::TooManyGuests(guests.len()));
        }

        guests.sort_by_key(|g| g.position);
        let mut previous = 0u8;
        for guest in &guests {
            if guest.position == 0 || guest.position as usize > MAX_GUESTS {
                return Err(InvitationError::InvalidPosition(guest.position));
            }
            if guest.position == previous {
                return Err(InvitationError::DuplicatePosition(guest.position));
            }
            if guest.first_name.trim().is_empty() || guest.last_name.trim().is_empty() {
                return Err(InvitationError::EmptyName(guest.position));
            }
            previous = guest.position;
        }

        if (party_size as i64) < guests.len() as i64 {
            return Err(InvitationError::PartySizeTooSmall {
                party_size,
                named: guests.len(),
            });
        }

        Ok(Self {
            id,
            guests,
            party_size,
            is_welcome_party_invited,
            is_rehearsal_dinner_invited,
            email,
            phone,
        })
    }

    /// Whether the party is invited to the given sub-event.
    ///
    /// The ceremony and reception is implicitly always included.
    pub fn is_invited_to(&self, event: SubEvent) -> bool {
        match event {
            SubEvent::RehearsalDinner => self.is_rehearsal_dinner_invited,
            SubEvent::WelcomeParty => self.is_welcome_party_invited,
            SubEvent::CeremonyReception => true,
        }
    }

    /// Sub-events this party is invited to, in chronological order.
    pub fn invited_events(&self) -> Vec<SubEvent> {
        SubEvent::ALL
            .into_iter()
            .filter(|event| self.is_invited_to(*event))
            .collect()
    }

    /// Guest names joined for display, e.g. "Jane Smith & John Smith".
    pub fn display_name(&self) -> String {
        self.guests
            .iter()
            .map(GuestName::full_name)
            .collect::<Vec<_>>()
            .join(" & ")
    }

    /// First names joined for greetings, e.g. "Jane & John".
    pub fn first_names(&self) -> String {
        self.guests
            .iter()
            .map(|g| g.first_name.as_str())
            .collect::<Vec<_>>()
            .join(" & ")
    }

    pub fn guest_at(&self, position: u8) -> Option<&GuestName> {
        self.guests.iter().find(|g| g.position == position)
    }
}

/// An invitation decorated with its fuzzy-match rank.
///
/// Only used to order and display candidates, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestSearchResult {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub similarity_score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guests(n: u8) -> Vec<GuestName> {
        (1..=n)
            .map(|p| GuestName::new(p, format!("Guest{}", p), "Smith"))
            .collect()
    }

    #[test]
    fn test_new_invitation_sorts_guests() {
        let invitation = Invitation::new(
            Uuid::nil(),
            vec![
                GuestName::new(2, "John", "Smith"),
                GuestName::new(1, "Jane", "Smith"),
            ],
            2,
            true,
            false,
            None,
            None,
        )
        .unwrap();

        assert_eq!(invitation.guests[0].first_name, "Jane");
        assert_eq!(invitation.guests[1].first_name, "John");
        assert_eq!(invitation.display_name(), "Jane Smith & John Smith");
        assert_eq!(invitation.first_names(), "Jane & John");
    }

    #[test]
    fn test_new_invitation_requires_a_guest() {
        let result = Invitation::new(Uuid::nil(), vec![], 1, false, false, None, None);
        assert_eq!(result.unwrap_err(), InvitationError::NoGuests);
    }

    #[test]
    fn test_new_invitation_rejects_five_guests() {
        let mut too_many = guests(4);
        too_many.push(GuestName::new(4, "Extra", "Guest"));
        let result = Invitation::new(Uuid::nil(), too_many, 5, false, false, None, None);
        assert_eq!(result.unwrap_err(), InvitationError::TooManyGuests(5));
    }

    #[test]
    fn test_new_invitation_rejects_bad_positions() {
        let result = Invitation::new(
            Uuid::nil(),
            vec![GuestName::new(5, "Jane", "Smith")],
            1,
            false,
            false,
            None,
            None,
        );
        assert_eq!(result.unwrap_err(), InvitationError::InvalidPosition(5));

        let result = Invitation::new(
            Uuid::nil(),
            vec![
                GuestName::new(1, "Jane", "Smith"),
                GuestName::new(1, "John", "Smith"),
            ],
            2,
            false,
            false,
            None,
            None,
        );
        assert_eq!(result.unwrap_err(), InvitationError::DuplicatePosition(1));
    }

    #[test]
    fn test_new_invitation_rejects_empty_names() {
        let result = Invitation::new(
            Uuid::nil(),
            vec![GuestName::new(1, "  ", "Smith")],
            1,
            false,
            false,
            None,
            None,
        );
        assert_eq!(result.unwrap_err(), InvitationError::EmptyName(1));
    }

    #[test]
    fn test_party_size_must_cover_named_guests() {
        let result = Invitation::new(Uuid::nil(), guests(3), 2, false, false, None, None);
        assert!(matches!(
            result.unwrap_err(),
            InvitationError::PartySizeTooSmall { party_size: 2, named: 3 }
        ));
    }

    #[test]
    fn test_invited_events() {
        let invitation =
            Invitation::new(Uuid::nil(), guests(1), 1, true, false, None, None).unwrap();
        assert_eq!(
            invitation.invited_events(),
            vec![SubEvent::WelcomeParty, SubEvent::CeremonyReception]
        );
        assert!(invitation.is_invited_to(SubEvent::CeremonyReception));
        assert!(!invitation.is_invited_to(SubEvent::RehearsalDinner));
    }

    #[test]
    fn test_search_result_serializes_flat() {
        let result = GuestSearchResult {
            invitation: Invitation::new(Uuid::nil(), guests(1), 2, false, true, None, None)
                .unwrap(),
            similarity_score: 0.75,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["party_size"], 2);
        assert_eq!(json["is_rehearsal_dinner_invited"], true);
        assert_eq!(json["similarity_score"], 0.75);
    }
}
