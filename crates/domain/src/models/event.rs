//! Sub-events of the wedding weekend and their schedule details.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One of the events a party may be invited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubEvent {
    RehearsalDinner,
    WelcomeParty,
    CeremonyReception,
}

impl SubEvent {
    /// All sub-events in chronological order.
    pub const ALL: [SubEvent; 3] = [
        SubEvent::RehearsalDinner,
        SubEvent::WelcomeParty,
        SubEvent::CeremonyReception,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubEvent::RehearsalDinner => "rehearsal_dinner",
            SubEvent::WelcomeParty => "welcome_party",
            SubEvent::CeremonyReception => "ceremony_reception",
        }
    }

    /// Phrase used in prompts and validation messages.
    pub fn phrase(&self) -> &'static str {
        match self {
            SubEvent::RehearsalDinner => "the rehearsal dinner",
            SubEvent::WelcomeParty => "the welcome party",
            SubEvent::CeremonyReception => "the ceremony and reception",
        }
    }
}

impl std::fmt::Display for SubEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schedule and venue details for a sub-event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EventDetails {
    pub title: String,
    /// Human-readable date and time, e.g. "Friday, October 25th, 2025 at 5:00 PM".
    pub schedule: String,
    pub venue: String,
    pub address: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl EventDetails {
    /// Step description shown in the wizard: "<schedule> - <venue>".
    pub fn step_description(&self) -> String {
        format!("{} - {}", self.schedule, self.venue)
    }

    /// Venue and address on one line, used for calendar locations.
    pub fn location(&self) -> String {
        if self.address.is_empty() {
            self.venue.clone()
        } else {
            format!("{}, {}", self.venue, self.address)
        }
    }
}

/// Details for every sub-event of the weekend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EventCatalog {
    pub rehearsal_dinner: EventDetails,
    pub welcome_party: EventDetails,
    pub ceremony_reception: EventDetails,
}

impl EventCatalog {
    pub fn get(&self, event: SubEvent) -> &EventDetails {
        match event {
            SubEvent::RehearsalDinner => &self.rehearsal_dinner,
            SubEvent::WelcomeParty => &self.welcome_party,
            SubEvent::CeremonyReception => &self.ceremony_reception,
        }
    }
}

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

const OYSTER_HOUSE: &str = "The Oyster House";
const OYSTER_HOUSE_ADDRESS: &str = "35 S Market St, Charleston, SC 29401";

// Times are Charleston local (EDT, UTC-4) expressed in UTC.
impl Default for EventCatalog {
    fn default() -> Self {
        Self {
            rehearsal_dinner: EventDetails {
                title: "Rehearsal Dinner".to_string(),
                schedule: "Friday, October 25th, 2025 at 5:00 PM".to_string(),
                venue: OYSTER_HOUSE.to_string(),
                address: OYSTER_HOUSE_ADDRESS.to_string(),
                starts_at: utc(2025, 10, 25, 21, 0),
                ends_at: utc(2025, 10, 25, 23, 30),
            },
            welcome_party: EventDetails {
                title: "Welcome Party".to_string(),
                schedule: "Friday, October 25th, 2025 at 8:00 PM".to_string(),
                venue: OYSTER_HOUSE.to_string(),
                address: OYSTER_HOUSE_ADDRESS.to_string(),
                starts_at: utc(2025, 10, 26, 0, 0),
                ends_at: utc(2025, 10, 26, 3, 0),
            },
            ceremony_reception: EventDetails {
                title: "Wedding Ceremony & Reception".to_string(),
                schedule: "Saturday, October 26th, 2025 at 5:00 PM".to_string(),
                venue: "Legare Waring House".to_string(),
                address: "1500 Old Towne Rd, Charleston, SC 29407".to_string(),
                starts_at: utc(2025, 10, 26, 21, 0),
                ends_at: utc(2025, 10, 27, 3, 0),
            },
        }
    }
}
