//! Confirmation shown once a submission has been written.

use serde::Serialize;

use super::calendar::CalendarLinks;
use super::notification::RsvpNotification;
use crate::models::{EventCatalog, SubEvent};

const CALENDAR_DESCRIPTION: &str = "Join us for our wedding celebration!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationVariant {
    Celebrate,
    MissYou,
}

/// An attended event echoed back with calendar actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedEvent {
    pub event: SubEvent,
    pub title: String,
    pub schedule: String,
    pub venue: String,
    pub address: String,
    /// Names of the guests attending this event.
    pub guests: Vec<String>,
    pub calendar: CalendarLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub variant: ConfirmationVariant,
    pub headline: String,
    pub message: String,
    pub footer: String,
    pub events: Vec<ConfirmedEvent>,
    pub dietary_notes: Vec<String>,
}

impl Confirmation {
    /// Renders the confirmation for the last submission, if any.
    pub fn render(submitted: Option<&RsvpNotification>, catalog: &EventCatalog) -> Option<Self> {
        let submitted = submitted?;

        if !submitted.attending_any {
            return Some(Self {
                variant: ConfirmationVariant::MissYou,
                headline: "We'll Miss You!".to_string(),
                message: "Thank you for letting us know. We'll miss having you there but appreciate your response.".to_string(),
                footer: "We hope to celebrate with you another time soon.".to_string(),
                events: Vec::new(),
                dietary_notes: Vec::new(),
            });
        }

        let events = submitted
            .attended_events()
            .into_iter()
            .map(|event| {
                let details = catalog.get(event);
                let guests = submitted
                    .guest_responses
                    .iter()
                    .filter(|r| match event {
                        SubEvent::CeremonyReception => r.attending,
                        SubEvent::WelcomeParty => r.welcome_party_attending == Some(true),
                        SubEvent::RehearsalDinner => r.rehearsal_dinner_attending == Some(true),
                    })
                    .map(|r| r.guest_full_name())
                    .collect();
                ConfirmedEvent {
                    event,
                    title: details.title.clone(),
                    schedule: details.schedule.clone(),
                    venue: details.venue.clone(),
                    address: details.address.clone(),
                    guests,
                    calendar: CalendarLinks::for_event(event, details, CALENDAR_DESCRIPTION),
                }
            })
            .collect();

        let dietary_notes = submitted
            .guest_responses
            .iter()
            .filter_map(|r| {
                r.dietary_restrictions
                    .as_ref()
                    .map(|notes| format!("{}: {}", r.guest_full_name(), notes))
            })
            .collect();

        Some(Self {
            variant: ConfirmationVariant::Celebrate,
            headline: "Thank You for Your RSVP!".to_string(),
            message: "We're thrilled that you'll be joining us on our special day!".to_string(),
            footer: "We've sent a confirmation to your email with all the details you'll need for the day.".to_string(),
            events,
            dietary_notes,
        })
    }
}
