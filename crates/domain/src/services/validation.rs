//! Step-scoped validation rules.
//!
//! Rules depend on the invitation (which events it includes, its party
//! size), so they are built once per selected invitation, one rule per step.

use std::collections::HashMap;

use serde::Serialize;
use shared::validation::{validate_email_address, validate_free_text, validate_phone};
use validator::ValidationError;

use super::step_plan::{FormField, Step, StepKind};
use crate::models::{Invitation, RsvpAnswers, SubEvent};

/// A field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_position: Option<u8>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field: field.name(),
            guest_position: None,
            message: message.into(),
        }
    }

    pub fn for_guest(field: FormField, position: u8, message: impl Into<String>) -> Self {
        Self {
            guest_position: Some(position),
            ..Self::new(field, message)
        }
    }

    fn from_validation(field: FormField, position: Option<u8>, err: ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        Self {
            guest_position: position,
            ..Self::new(field, message)
        }
    }
}

/// Validation rule for one step kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRule {
    /// Every guest must answer; the head count is checked only when
    /// somebody attends.
    EventAttendance { event: SubEvent, party_size: u32 },
    /// Contact e-mail required, phone optional, free text bounded.
    ContactDetails { max_text_length: usize },
}

impl StepRule {
    pub fn check(&self, answers: &RsvpAnswers) -> Result<(), Vec<FieldError>> {
        let errors = match self {
            StepRule::EventAttendance { event, party_size } => {
                check_attendance(*event, *party_size, answers)
            }
            StepRule::ContactDetails { max_text_length } => {
                check_contact(*max_text_length, answers)
            }
        };
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_attendance(event: SubEvent, party_size: u32, answers: &RsvpAnswers) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = answers
        .guests
        .iter()
        .filter(|g| g.attendance(event).is_none())
        .map(|g| {
            FieldError::for_guest(
                FormField::Attendance(event),
                g.position,
                format!("Please let us know if you'll be attending {}", event.phrase()),
            )
        })
        .collect();

    let attending = answers.attending_count(event) as u32;
    if attending == 0 {
        return errors;
    }

    let field = FormField::GuestCount(event);
    match answers.guest_counts.get(event) {
        None => errors.push(FieldError::new(
            field,
            "Please specify how many guests will attend",
        )),
        Some(count) if count < attending.max(1) => {
            let message = if attending <= 1 {
                "Please specify at least 1 guest".to_string()
            } else {
                format!("Please specify at least {} guests", attending)
            };
            errors.push(FieldError::new(field, message));
        }
        Some(count) if count > party_size => errors.push(FieldError::new(
            field,
            format!("Maximum {} guests allowed", party_size),
        )),
        Some(_) => {}
    }
    errors
}

fn check_contact(max_text_length: usize, answers: &RsvpAnswers) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_email_address(&answers.email) {
        errors.push(FieldError::from_validation(FormField::Email, None, e));
    }
    if let Err(e) = validate_phone(&answers.phone) {
        errors.push(FieldError::from_validation(FormField::Phone, None, e));
    }
    for guest in &answers.guests {
        if let Err(e) = validate_free_text(&guest.dietary_restrictions, max_text_length) {
            errors.push(FieldError::from_validation(
                FormField::DietaryRestrictions,
                Some(guest.position),
                e,
            ));
        }
        if let Err(e) = validate_free_text(&guest.message, max_text_length) {
            errors.push(FieldError::from_validation(
                FormField::Message,
                Some(guest.position),
                e,
            ));
        }
    }
    errors
}

/// Rules for every step of one invitation's plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRules {
    rules: HashMap<StepKind, StepRule>,
}

impl StepRules {
    pub fn build(invitation: &Invitation, steps: &[Step], max_text_length: usize) -> Self {
        let party_size = invitation.party_size.max(0) as u32;
        let rules = steps
            .iter()
            .map(|step| {
                let rule = match step.kind.event() {
                    Some(event) => StepRule::EventAttendance { event, party_size },
                    None => StepRule::ContactDetails { max_text_length },
                };
                (step.kind, rule)
            })
            .collect();
        Self { rules }
    }

    pub fn rule(&self, kind: StepKind) -> Option<&StepRule> {
        self.rules.get(&kind)
    }

    /// Validates only the fields owned by `kind`.
    pub fn validate_step(&self, kind: StepKind, answers: &RsvpAnswers) -> Result<(), Vec<FieldError>> {
        match self.rules.get(&kind) {
            Some(rule) => rule.check(answers),
            None => Ok(()),
        }
    }

    /// Validates every step, in plan order.
    pub fn validate_all(&self, steps: &[Step], answers: &RsvpAnswers) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = steps
            .iter()
            .filter_map(|step| self.validate_step(step.kind, answers).err())
            .flatten()
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventCatalog, GuestName};
    use crate::services::step_plan::build_steps;
    use uuid::Uuid;

    fn invitation(party_size: i32) -> Invitation {
        Invitation::new(
            Uuid::new_v4(),
            vec![
                GuestName::new(1, "Jane", "Smith"),
                GuestName::new(2, "John", "Smith"),
            ],
            party_size,
            true,
            false,
            Some("smiths@example.com".to_string()),
            None,
        )
        .unwrap()
    }

    fn rules_for(invitation: &Invitation) -> (Vec<Step>, StepRules) {
        let steps = build_steps(invitation, &EventCatalog::default());
        let rules = StepRules::build(invitation, &steps, 50);
        (steps, rules)
    }

    #[test]
    fn test_rules_follow_plan() {
        let invitation = invitation(2);
        let (_, rules) = rules_for(&invitation);
        assert_eq!(
            rules.rule(StepKind::WelcomeParty),
            Some(&StepRule::EventAttendance {
                event: SubEvent::WelcomeParty,
                party_size: 2
            })
        );
        assert!(rules.rule(StepKind::RehearsalDinner).is_none());
        assert_eq!(
            rules.rule(StepKind::ContactDetails),
            Some(&StepRule::ContactDetails { max_text_length: 50 })
        );
    }

    #[test]
    fn test_defaults_pass_every_step() {
        let invitation = invitation(3);
        let (steps, rules) = rules_for(&invitation);
        let answers = RsvpAnswers::defaults_for(&invitation);
        assert!(rules.validate_all(&steps, &answers).is_ok());
    }

    #[test]
    fn test_missing_attendance_is_reported_per_guest() {
        let invitation = invitation(2);
        let (_, rules) = rules_for(&invitation);
        let mut answers = RsvpAnswers::defaults_for(&invitation);
        answers.guests[1].welcome_party = None;

        let errors = rules
            .validate_step(StepKind::WelcomeParty, &answers)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].guest_position, Some(2));
        assert_eq!(
            errors[0].message,
            "Please let us know if you'll be attending the welcome party"
        );
    }

    #[test]
    fn test_guest_count_bounds_only_when_attending() {
        let invitation = invitation(3);
        let (_, rules) = rules_for(&invitation);
        let mut answers = RsvpAnswers::defaults_for(&invitation);

        answers.guest_counts.ceremony_reception = Some(4);
        let errors = rules.validate_step(StepKind::Ceremony, &answers).unwrap_err();
        assert_eq!(errors[0].message, "Maximum 3 guests allowed");
        assert_eq!(errors[0].field, "ceremony_reception.guest_count");

        answers.guest_counts.ceremony_reception = Some(1);
        let errors = rules.validate_step(StepKind::Ceremony, &answers).unwrap_err();
        assert_eq!(errors[0].message, "Please specify at least 2 guests");

        for guest in answers.guests.iter_mut() {
            guest.ceremony_reception = Some(false);
        }
        answers.guest_counts.ceremony_reception = Some(99);
        assert!(rules.validate_step(StepKind::Ceremony, &answers).is_ok());
    }

    #[test]
    fn test_scoped_validation_ignores_other_steps() {
        let invitation = invitation(2);
        let (_, rules) = rules_for(&invitation);
        let mut answers = RsvpAnswers::defaults_for(&invitation);
        answers.email = String::new();

        assert!(rules.validate_step(StepKind::WelcomeParty, &answers).is_ok());
        let errors = rules
            .validate_step(StepKind::ContactDetails, &answers)
            .unwrap_err();
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn test_contact_details_rules() {
        let invitation = invitation(2);
        let (_, rules) = rules_for(&invitation);
        let mut answers = RsvpAnswers::defaults_for(&invitation);
        answers.email = "not-an-email".to_string();
        answers.phone = "12".to_string();
        answers.guests[0].message = "x".repeat(51);

        let errors = rules
            .validate_step(StepKind::ContactDetails, &answers)
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "phone", "message"]);
        assert_eq!(errors[0].message, "Please enter a valid email address");
        assert_eq!(errors[2].guest_position, Some(1));
    }
}
