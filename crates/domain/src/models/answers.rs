//! In-progress RSVP answers collected by the wizard.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::event::SubEvent;
use super::invitation::Invitation;

/// Errors raised when an answer edit does not fit the invitation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswersError {
    #[error("No guest at position {0} on this invitation")]
    UnknownGuest(u8),

    #[error("Guest at position {0} appears more than once in the update")]
    DuplicateGuest(u8),

    #[error("This invitation does not include {}", .0.phrase())]
    NotInvited(SubEvent),
}

/// Answers for one named guest.
///
/// Attendance is `None` for events the invitation does not include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestAnswers {
    pub position: u8,
    pub first_name: String,
    pub last_name: String,
    pub ceremony_reception: Option<bool>,
    pub welcome_party: Option<bool>,
    pub rehearsal_dinner: Option<bool>,
    pub dietary_restrictions: String,
    pub message: String,
}

impl GuestAnswers {
    pub fn attendance(&self, event: SubEvent) -> Option<bool> {
        match event {
            SubEvent::RehearsalDinner => self.rehearsal_dinner,
            SubEvent::WelcomeParty => self.welcome_party,
            SubEvent::CeremonyReception => self.ceremony_reception,
        }
    }

    fn attendance_mut(&mut self, event: SubEvent) -> &mut Option<bool> {
        match event {
            SubEvent::RehearsalDinner => &mut self.rehearsal_dinner,
            SubEvent::WelcomeParty => &mut self.welcome_party,
            SubEvent::CeremonyReception => &mut self.ceremony_reception,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Party-level head counts claimed per event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestCounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rehearsal_dinner: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_party: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceremony_reception: Option<u32>,
}

impl GuestCounts {
    pub fn get(&self, event: SubEvent) -> Option<u32> {
        match event {
            SubEvent::RehearsalDinner => self.rehearsal_dinner,
            SubEvent::WelcomeParty => self.welcome_party,
            SubEvent::CeremonyReception => self.ceremony_reception,
        }
    }

    pub fn set(&mut self, event: SubEvent, count: Option<u32>) {
        match event {
            SubEvent::RehearsalDinner => self.rehearsal_dinner = count,
            SubEvent::WelcomeParty => self.welcome_party = count,
            SubEvent::CeremonyReception => self.ceremony_reception = count,
        }
    }
}

/// Everything the wizard collects for one invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RsvpAnswers {
    pub guests: Vec<GuestAnswers>,
    pub guest_counts: GuestCounts,
    pub email: String,
    pub phone: String,
}

impl RsvpAnswers {
    /// Initial answers for an invitation.
    ///
    /// Opt-out model: every guest is assumed to attend each event the party
    /// is invited to. Head counts start at the party size.
    pub fn defaults_for(invitation: &Invitation) -> Self {
        let invited = |event| invitation.is_invited_to(event).then_some(true);
        let guests = invitation
            .guests
            .iter()
            .map(|guest| GuestAnswers {
                position: guest.position,
                first_name: guest.first_name.clone(),
                last_name: guest.last_name.clone(),
                ceremony_reception: invited(SubEvent::CeremonyReception),
                welcome_party: invited(SubEvent::WelcomeParty),
                rehearsal_dinner: invited(SubEvent::RehearsalDinner),
                dietary_restrictions: String::new(),
                message: String::new(),
            })
            .collect();

        let party_size = invitation.party_size.max(0) as u32;
        let mut guest_counts = GuestCounts::default();
        for event in invitation.invited_events() {
            guest_counts.set(event, Some(party_size));
        }

        Self {
            guests,
            guest_counts,
            email: invitation.email.clone().unwrap_or_default(),
            phone: invitation.phone.clone().unwrap_or_default(),
        }
    }

    /// Number of named guests marked as attending `event`.
    pub fn attending_count(&self, event: SubEvent) -> usize {
        self.guests
            .iter()
            .filter(|g| g.attendance(event) == Some(true))
            .count()
    }

    /// Whether any named guest is attending `event`.
    pub fn anyone_attending(&self, event: SubEvent) -> bool {
        self.attending_count(event) > 0
    }

    /// Merges an edit into the answers.
    ///
    /// The edit is applied all-or-nothing: on error nothing changes.
    pub fn apply(&mut self, invitation: &Invitation, patch: AnswersPatch) -> Result<(), AnswersError> {
        let mut updated = self.clone();
        let mut seen = Vec::with_capacity(patch.guests.len());

        for guest_patch in patch.guests {
            if seen.contains(&guest_patch.position) {
                return Err(AnswersError::DuplicateGuest(guest_patch.position));
            }
            seen.push(guest_patch.position);

            let guest = updated
                .guests
                .iter_mut()
                .find(|g| g.position == guest_patch.position)
                .ok_or(AnswersError::UnknownGuest(guest_patch.position))?;

            for (event, value) in [
                (SubEvent::CeremonyReception, guest_patch.ceremony_reception),
                (SubEvent::WelcomeParty, guest_patch.welcome_party),
                (SubEvent::RehearsalDinner, guest_patch.rehearsal_dinner),
            ] {
                if let Some(attending) = value {
                    if !invitation.is_invited_to(event) {
                        return Err(AnswersError::NotInvited(event));
                    }
                    *guest.attendance_mut(event) = Some(attending);
                }
            }

            if let Some(text) = guest_patch.dietary_restrictions {
                guest.dietary_restrictions = text;
            }
            if let Some(text) = guest_patch.message {
                guest.message = text;
            }
        }

        if let Some(counts) = patch.guest_counts {
            for event in SubEvent::ALL {
                if let Some(count) = counts.get(event) {
                    if !invitation.is_invited_to(event) {
                        return Err(AnswersError::NotInvited(event));
                    }
                    updated.guest_counts.set(event, Some(count));
                }
            }
        }

        if let Some(email) = patch.email {
            updated.email = email;
        }
        if let Some(phone) = patch.phone {
            updated.phone = phone;
        }

        *self = updated;
        Ok(())
    }
}

/// Edit to one guest's answers. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuestAnswersPatch {
    pub position: u8,
    #[serde(default)]
    pub ceremony_reception: Option<bool>,
    #[serde(default)]
    pub welcome_party: Option<bool>,
    #[serde(default)]
    pub rehearsal_dinner: Option<bool>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Edit to the wizard's answers. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnswersPatch {
    #[serde(default)]
    pub guests: Vec<GuestAnswersPatch>,
    #[serde(default)]
    pub guest_counts: Option<GuestCounts>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
