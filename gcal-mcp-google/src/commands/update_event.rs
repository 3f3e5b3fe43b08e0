use chrono_tz::Tz;
use gcal_mcp_core::{CoreResult, EventTime};
use serde::{Deserialize, Serialize};

use super::authed_client;
use super::get_event::format_details;
use crate::context::CalendarContext;
use crate::google_event::{EventAttendee, EventDateTime, GoogleEvent};
use crate::outcome::ToolOutcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fullday: Option<bool>,
}

impl UpdateEvent {
    fn touches_schedule(&self) -> bool {
        self.start_date_time.is_some() || self.end_date_time.is_some() || self.is_fullday.is_some()
    }
}

/// A boundary for the new schedule: the provided instant staged in the
/// chosen representation, else the existing boundary converted into it.
fn reschedule(
    provided: Option<&str>,
    existing: Option<EventDateTime>,
    all_day: bool,
    tz: &Tz,
    which: &'static str,
) -> CoreResult<EventDateTime> {
    match provided {
        Some(value) if all_day => Ok(EventTime::date_from_instant(value, tz)?.into()),
        Some(value) => Ok(EventTime::DateTime(value.to_string()).into()),
        None => existing
            .unwrap_or_default()
            .into_representation(all_day, tz, which),
    }
}

/// Overlay the provided fields onto the fetched event. Fields left out are
/// untouched; attendees are replaced wholesale.
pub fn apply(cmd: &UpdateEvent, mut event: GoogleEvent, tz: &Tz) -> CoreResult<GoogleEvent> {
    if let Some(summary) = &cmd.summary {
        event.summary = Some(summary.clone());
    }
    if let Some(description) = &cmd.description {
        event.description = Some(description.clone());
    }
    if let Some(location) = &cmd.location {
        event.location = Some(location.clone());
    }
    if let Some(attendees) = &cmd.attendees {
        event.attendees = Some(attendees.iter().map(EventAttendee::with_email).collect());
    }

    if cmd.touches_schedule() {
        let all_day = cmd.is_fullday == Some(true);

        let start = reschedule(
            cmd.start_date_time.as_deref(),
            event.start.take(),
            all_day,
            tz,
            "start",
        )?;
        let end = reschedule(
            cmd.end_date_time.as_deref(),
            event.end.take(),
            all_day,
            tz,
            "end",
        )?;

        event.start = Some(start);
        event.end = Some(end);
    }

    Ok(event)
}

pub async fn handle(ctx: &CalendarContext, cmd: UpdateEvent) -> ToolOutcome {
    const ACTION: &str = "updating event";

    let client = match authed_client(ctx).await {
        Ok(client) => client,
        Err(outcome) => return outcome,
    };
    let api = client.api();

    let current = match api.get_event(ctx.calendar_id(), &cmd.event_id).await {
        Ok(event) => event,
        Err(e) => return ToolOutcome::from_lookup(e, &cmd.event_id, ACTION),
    };

    let request = match apply(&cmd, current, ctx.timezone()) {
        Ok(request) => request,
        Err(e) => return ToolOutcome::provider_error(ACTION, e.to_string()),
    };

    match api.update_event(ctx.calendar_id(), &cmd.event_id, &request).await {
        Ok(updated) => {
            tracing::info!(id = %cmd.event_id, "Updated event");
            ToolOutcome::text(format!(
                "Event updated successfully!\n\n{}",
                format_details(&updated)
            ))
        }
        Err(e) => ToolOutcome::from_lookup(e, &cmd.event_id, ACTION),
    }
}
