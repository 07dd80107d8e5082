//! Add-to-calendar actions for attended events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::models::{EventDetails, SubEvent};

const GOOGLE_CALENDAR_URL: &str = "https://calendar.google.com/calendar/render";
const OUTLOOK_CALENDAR_URL: &str = "https://outlook.live.com/calendar/0/deeplink/compose";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarLinks {
    pub google_url: String,
    pub outlook_url: String,
    /// iCalendar document with a single VEVENT.
    pub ics: String,
    pub ics_filename: String,
}

impl CalendarLinks {
    pub fn for_event(event: SubEvent, details: &EventDetails, description: &str) -> Self {
        Self {
            google_url: google_url(details, description),
            outlook_url: outlook_url(details, description),
            ics: ics_document(event, details, description, Utc::now()),
            ics_filename: format!("{}.ics", slug(&details.title)),
        }
    }
}

fn compact(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

fn google_url(details: &EventDetails, description: &str) -> String {
    let dates = format!("{}/{}", compact(details.starts_at), compact(details.ends_at));
    Url::parse_with_params(
        GOOGLE_CALENDAR_URL,
        &[
            ("action", "TEMPLATE"),
            ("text", details.title.as_str()),
            ("dates", dates.as_str()),
            ("details", description),
            ("location", details.location().as_str()),
        ],
    )
    .map(String::from)
    .unwrap_or_default()
}

fn outlook_url(details: &EventDetails, description: &str) -> String {
    let start = details.starts_at.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let end = details.ends_at.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    Url::parse_with_params(
        OUTLOOK_CALENDAR_URL,
        &[
            ("subject", details.title.as_str()),
            ("startdt", start.as_str()),
            ("enddt", end.as_str()),
            ("body", description),
            ("location", details.location().as_str()),
        ],
    )
    .map(String::from)
    .unwrap_or_default()
}

/// Escapes TEXT values per RFC 5545.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

fn ics_document(
    event: SubEvent,
    details: &EventDetails,
    description: &str,
    stamp: DateTime<Utc>,
) -> String {
    [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Wedding RSVP//Calendar//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}-{}@wedding-rsvp", event, compact(details.starts_at)),
        format!("DTSTAMP:{}", compact(stamp)),
        format!("DTSTART:{}", compact(details.starts_at)),
        format!("DTEND:{}", compact(details.ends_at)),
        format!("SUMMARY:{}", escape_text(&details.title)),
        format!("DESCRIPTION:{}", escape_text(description)),
        format!("LOCATION:{}", escape_text(&details.location())),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ]
    .join("\r\n")
        + "\r\n"
}

fn slug(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
