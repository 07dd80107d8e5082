//! Email-backed RSVP notifier.
//!
//! Each submission produces two messages: a notification to the couple and a
//! confirmation to the guest who responded.

use async_trait::async_trait;
use domain::models::EventCatalog;
use domain::services::{NotificationResult, RsvpNotification, RsvpNotifier};
use handlebars::Handlebars;
use serde_json::json;
use std::fmt::Write as _;
use std::sync::Arc;

use super::email::{EmailMessage, EmailService};

const COUPLE_FROM_NAME: &str = "Wedding RSVP";
const ATTENDING_SUBJECT: &str = "We can't wait to celebrate with you! 🎉";
const DECLINED_SUBJECT: &str = "Thank you for letting us know ❤️";

/// HTML body: one paragraph per block of the text body. Double-brace
/// expressions are escaped by the renderer.
const HTML_LAYOUT: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\
<body style=\"font-family: Georgia, serif; color: #333; max-width: 600px; margin: 0 auto;\">\
{{#each paragraphs}}<p>{{#each this}}{{#unless @first}}<br>{{/unless}}{{this}}{{/each}}</p>{{/each}}\
</body></html>";

pub struct EmailRsvpNotifier {
    email: EmailService,
    catalog: Arc<EventCatalog>,
    handlebars: Handlebars<'static>,
}

impl EmailRsvpNotifier {
    pub fn new(email: EmailService, catalog: Arc<EventCatalog>) -> Self {
        Self {
            email,
            catalog,
            handlebars: Handlebars::new(),
        }
    }

    /// HTML rendering of a plain-text body, when the provider sends HTML.
    ///
    /// A render failure degrades to a text-only message.
    fn html_body(&self, text: &str) -> Option<String> {
        if !self.email.wants_html() {
            return None;
        }

        let paragraphs: Vec<Vec<&str>> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| block.lines().collect())
            .collect();

        match self
            .handlebars
            .render_template(HTML_LAYOUT, &json!({ "paragraphs": paragraphs }))
        {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to render HTML email body, sending text only");
                None
            }
        }
    }

    /// Message to the couple; `None` when no recipients are configured.
    fn couple_message(&self, n: &RsvpNotification) -> Option<EmailMessage> {
        let recipients = &self.email.config().notification_recipients;
        if recipients.is_empty() {
            return None;
        }

        let mut text = String::new();
        let _ = writeln!(text, "New RSVP received\n");
        let _ = writeln!(text, "Guests: {}", n.guest_names());
        let _ = writeln!(text, "Email: {}", n.email);
        if let Some(phone) = &n.invitation.phone {
            let _ = writeln!(text, "Phone: {}", phone);
        }
        let _ = writeln!(text, "Party size: {}\n", n.invitation.party_size);

        let _ = writeln!(text, "Event attendance:");
        for tally in n.event_tallies() {
            let mark = if tally.attending > 0 { "✅" } else { "❌" };
            match tally.head_count {
                Some(count) => {
                    let _ = writeln!(text, "{} {} (head count {})", mark, tally.summary(), count);
                }
                None => {
                    let _ = writeln!(text, "{} {}", mark, tally.summary());
                }
            }
        }

        let dietary: Vec<_> = n
            .guest_responses
            .iter()
            .filter_map(|r| r.dietary_restrictions.as_ref().map(|d| (r.guest_full_name(), d)))
            .collect();
        if !dietary.is_empty() {
            let _ = writeln!(text, "\nDietary restrictions:");
            for (name, notes) in &dietary {
                let _ = writeln!(text, "- {}: {}", name, notes);
            }
        }

        let messages: Vec<_> = n
            .guest_responses
            .iter()
            .filter_map(|r| r.message.as_ref().map(|m| (r.guest_full_name(), m)))
            .collect();
        if !messages.is_empty() {
            let _ = writeln!(text, "\nMessages:");
            for (name, message) in &messages {
                let _ = writeln!(text, "- {}: \"{}\"", name, message);
            }
        }

        let _ = write!(text, "\nSubmitted: {}", n.submitted_at.to_rfc2822());

        Some(EmailMessage {
            to: recipients.clone(),
            from_name: Some(COUPLE_FROM_NAME.to_string()),
            subject: format!("New Wedding RSVP from {}", n.guest_names()),
            body_html: self.html_body(&text),
            body_text: text,
        })
    }

    /// Confirmation to the guest, with details for every attended event.
    fn guest_message(&self, n: &RsvpNotification) -> EmailMessage {
        let mut text = String::new();
        let _ = writeln!(text, "Dear {},\n", n.invitation.first_names());

        if n.attending_any {
            let _ = writeln!(text, "We're so excited to celebrate with you!\n");
            for event in n.attended_events() {
                let details = self.catalog.get(event);
                let _ = writeln!(text, "{}", details.title);
                let _ = writeln!(text, "  {}", details.schedule);
                let _ = writeln!(text, "  {}\n", details.location());
            }
        } else {
            let _ = writeln!(
                text,
                "We appreciate you letting us know. We'll miss having you there!\n"
            );
        }

        let _ = writeln!(text, "Your response:");
        for tally in n.event_tallies() {
            let _ = writeln!(text, "- {}", tally.summary());
        }

        let site_url = &self.email.config().site_url;
        if !site_url.is_empty() {
            let _ = writeln!(text, "\nWedding details: {}", site_url);
        }

        EmailMessage {
            to: vec![n.email.clone()],
            from_name: None,
            subject: if n.attending_any {
                ATTENDING_SUBJECT
            } else {
                DECLINED_SUBJECT
            }
            .to_string(),
            body_html: self.html_body(&text),
            body_text: text,
        }
    }
}

#[async_trait]
impl RsvpNotifier for EmailRsvpNotifier {
    async fn notify(&self, notification: RsvpNotification) -> NotificationResult {
        if !self.email.is_enabled() {
            return NotificationResult::Skipped;
        }

        let mut failures = Vec::new();

        match self.couple_message(&notification) {
            Some(message) => {
                if let Err(e) = self.email.send(message).await {
                    failures.push(format!("couple notification: {}", e));
                }
            }
            None => tracing::warn!(
                invitation_id = %notification.invitation.id,
                "No notification recipients configured, couple email skipped"
            ),
        }

        if let Err(e) = self.email.send(self.guest_message(&notification)).await {
            failures.push(format!("guest confirmation: {}", e));
        }

        if failures.is_empty() {
            NotificationResult::Sent
        } else {
            NotificationResult::Failed(failures.join("; "))
        }
    }
}
