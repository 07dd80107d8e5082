//! Step plan builder.
//!
//! Computes the ordered wizard steps for an invitation from its sub-event
//! flags: `[RehearsalDinner?, WelcomeParty?, Ceremony, ContactDetails]`.

use serde::Serialize;

use crate::models::{EventCatalog, Invitation, SubEvent};

/// Description of the contact step, which has no event behind it.
pub const CONTACT_DETAILS_DESCRIPTION: &str =
    "Please provide your contact information and any special requirements";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    RehearsalDinner,
    WelcomeParty,
    Ceremony,
    ContactDetails,
}

impl StepKind {
    /// The sub-event an attendance step asks about.
    pub fn event(&self) -> Option<SubEvent> {
        match self {
            StepKind::RehearsalDinner => Some(SubEvent::RehearsalDinner),
            StepKind::WelcomeParty => Some(SubEvent::WelcomeParty),
            StepKind::Ceremony => Some(SubEvent::CeremonyReception),
            StepKind::ContactDetails => None,
        }
    }

    fn for_event(event: SubEvent) -> Self {
        match event {
            SubEvent::RehearsalDinner => StepKind::RehearsalDinner,
            SubEvent::WelcomeParty => StepKind::WelcomeParty,
            SubEvent::CeremonyReception => StepKind::Ceremony,
        }
    }
}

/// A form field owned by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "field", content = "event", rename_all = "snake_case")]
pub enum FormField {
    /// Per-guest attendance for the event.
    Attendance(SubEvent),
    /// Party-level head count for the event.
    GuestCount(SubEvent),
    Email,
    Phone,
    /// Per-guest dietary restrictions.
    DietaryRestrictions,
    /// Per-guest message to the couple.
    Message,
}

impl FormField {
    /// Name used in field-level validation messages.
    pub fn name(&self) -> String {
        match self {
            FormField::Attendance(event) => format!("{}.attending", event),
            FormField::GuestCount(event) => format!("{}.guest_count", event),
            FormField::Email => "email".to_string(),
            FormField::Phone => "phone".to_string(),
            FormField::DietaryRestrictions => "dietary_restrictions".to_string(),
            FormField::Message => "message".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub kind: StepKind,
    pub title: String,
    pub description: String,
    pub fields: Vec<FormField>,
}

impl Step {
    fn event(event: SubEvent, catalog: &EventCatalog) -> Self {
        let details = catalog.get(event);
        Self {
            kind: StepKind::for_event(event),
            title: details.title.clone(),
            description: details.step_description(),
            fields: vec![FormField::Attendance(event), FormField::GuestCount(event)],
        }
    }

    fn contact_details() -> Self {
        Self {
            kind: StepKind::ContactDetails,
            title: "Additional Details".to_string(),
            description: CONTACT_DETAILS_DESCRIPTION.to_string(),
            fields: vec![
                FormField::Email,
                FormField::Phone,
                FormField::DietaryRestrictions,
                FormField::Message,
            ],
        }
    }
}

/// Builds the step plan for an invitation. Pure and deterministic.
pub fn build_steps(invitation: &Invitation, catalog: &EventCatalog) -> Vec<Step> {
    let mut steps: Vec<Step> = invitation
        .invited_events()
        .into_iter()
        .map(|event| Step::event(event, catalog))
        .collect();
    steps.push(Step::contact_details());
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuestName;
    use uuid::Uuid;

    fn invitation(welcome: bool, rehearsal: bool) -> Invitation {
        Invitation::new(
            Uuid::new_v4(),
            vec![GuestName::new(1, "Jane", "Smith")],
            1,
            welcome,
            rehearsal,
            None,
            None,
        )
        .unwrap()
    }

    fn kinds(steps: &[Step]) -> Vec<StepKind> {
        steps.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_all_events_invited() {
        let steps = build_steps(&invitation(true, true), &EventCatalog::default());
        assert_eq!(
            kinds(&steps),
            vec![
                StepKind::RehearsalDinner,
                StepKind::WelcomeParty,
                StepKind::Ceremony,
                StepKind::ContactDetails
            ]
        );
    }

    #[test]
    fn test_ceremony_only() {
        let steps = build_steps(&invitation(false, false), &EventCatalog::default());
        assert_eq!(
            kinds(&steps),
            vec![StepKind::Ceremony, StepKind::ContactDetails]
        );
    }

    #[test]
    fn test_single_optional_event() {
        let steps = build_steps(&invitation(true, false), &EventCatalog::default());
        assert_eq!(
            kinds(&steps),
            vec![
                StepKind::WelcomeParty,
                StepKind::Ceremony,
                StepKind::ContactDetails
            ]
        );

        let steps = build_steps(&invitation(false, true), &EventCatalog::default());
        assert_eq!(steps[0].kind, StepKind::RehearsalDinner);
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_step_text() {
        let steps = build_steps(&invitation(true, true), &EventCatalog::default());
        assert_eq!(steps[0].title, "Rehearsal Dinner");
        assert_eq!(
            steps[1].description,
            "Friday, October 25th, 2025 at 8:00 PM - The Oyster House"
        );
        assert_eq!(steps[2].title, "Wedding Ceremony & Reception");
        assert_eq!(steps[3].title, "Additional Details");
        assert_eq!(steps[3].description, CONTACT_DETAILS_DESCRIPTION);
    }

    #[test]
    fn test_fields_owned_by_steps() {
        let steps = build_steps(&invitation(false, false), &EventCatalog::default());
        assert_eq!(
            steps[0].fields,
            vec![
                FormField::Attendance(SubEvent::CeremonyReception),
                FormField::GuestCount(SubEvent::CeremonyReception)
            ]
        );
        assert!(steps[1].fields.contains(&FormField::Email));
        assert_eq!(
            FormField::GuestCount(SubEvent::WelcomeParty).name(),
            "welcome_party.guest_count"
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let invitation = invitation(true, false);
        let catalog = EventCatalog::default();
        assert_eq!(
            build_steps(&invitation, &catalog),
            build_steps(&invitation, &catalog)
        );
    }
}
