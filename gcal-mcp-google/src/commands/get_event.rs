use serde::{Deserialize, Serialize};

use super::authed_client;
use crate::context::CalendarContext;
use crate::google_event::{EventDateTime, GoogleEvent};
use crate::outcome::ToolOutcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEvent {
    pub event_id: String,
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("(unknown)")
}

pub(super) fn boundary(value: &Option<EventDateTime>) -> String {
    value
        .as_ref()
        .map(EventDateTime::display)
        .unwrap_or_else(|| "(unknown)".to_string())
}

/// Multi-line details block shared by `getEvent` and `updateEvent`.
pub fn format_details(event: &GoogleEvent) -> String {
    let mut lines = vec![
        "Event Details:".to_string(),
        format!("Title: {}", event.title()),
        format!("ID: {}", or_unknown(event.id.as_deref())),
        format!("Status: {}", or_unknown(event.status.as_deref())),
        format!("Created: {}", or_unknown(event.created.as_deref())),
        format!("Updated: {}", or_unknown(event.updated.as_deref())),
        format!("Start: {}", boundary(&event.start)),
        format!("End: {}", boundary(&event.end)),
        format!("All Day: {}", if event.is_all_day() { "Yes" } else { "No" }),
    ];

    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Description: {}", description));
    }

    if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
        lines.push(format!("Location: {}", location));
    }

    if let Some(attendees) = event.attendees.as_ref().filter(|a| !a.is_empty()) {
        let list: Vec<String> = attendees
            .iter()
            .map(|a| {
                let email = a.email.as_deref().unwrap_or("(unknown)");
                match &a.response_status {
                    Some(status) => format!("{} ({})", email, status),
                    None => email.to_string(),
                }
            })
            .collect();
        lines.push(format!("Attendees: {}", list.join(", ")));
    }

    if let Some(email) = event.organizer.as_ref().and_then(|o| o.email.as_deref()) {
        lines.push(format!("Organizer: {}", email));
    }

    if let Some(link) = event.html_link.as_deref() {
        lines.push(format!("Calendar Link: {}", link));
    }

    lines.join("\n")
}

pub async fn handle(ctx: &CalendarContext, cmd: GetEvent) -> ToolOutcome {
    let client = match authed_client(ctx).await {
        Ok(client) => client,
        Err(outcome) => return outcome,
    };

    match client.api().get_event(ctx.calendar_id(), &cmd.event_id).await {
        Ok(event) => ToolOutcome::text(format_details(&event)),
        Err(e) => ToolOutcome::from_lookup(e, &cmd.event_id, "retrieving event"),
    }
}
