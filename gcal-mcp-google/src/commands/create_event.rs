use chrono_tz::Tz;
use gcal_mcp_core::{CoreResult, EventTime};
use serde::{Deserialize, Serialize};

use super::authed_client;
use crate::context::CalendarContext;
use crate::google_event::{EventAttendee, EventDateTime, GoogleEvent};
use crate::outcome::ToolOutcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub summary: String,
    pub start_date_time: String,
    pub end_date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fullday: Option<bool>,
}

/// Stage the request body. Full-day events carry only `date` on both
/// boundaries (the instant's calendar date in `tz`); timed events carry
/// the input strings as `dateTime`.
pub fn build_request(cmd: &CreateEvent, tz: &Tz) -> CoreResult<GoogleEvent> {
    let (start, end) = if cmd.is_fullday.unwrap_or(false) {
        (
            EventTime::date_from_instant(&cmd.start_date_time, tz)?,
            EventTime::date_from_instant(&cmd.end_date_time, tz)?,
        )
    } else {
        (
            EventTime::DateTime(cmd.start_date_time.clone()),
            EventTime::DateTime(cmd.end_date_time.clone()),
        )
    };

    let attendees = cmd
        .attendees
        .as_ref()
        .filter(|emails| !emails.is_empty())
        .map(|emails| emails.iter().map(EventAttendee::with_email).collect());

    let description = cmd.description.clone().filter(|d| !d.is_empty());

    Ok(GoogleEvent {
        summary: Some(cmd.summary.clone()),
        description,
        start: Some(EventDateTime::from(start)),
        end: Some(EventDateTime::from(end)),
        attendees,
        ..Default::default()
    })
}

pub async fn handle(ctx: &CalendarContext, cmd: CreateEvent) -> ToolOutcome {
    let client = match authed_client(ctx).await {
        Ok(client) => client,
        Err(outcome) => return outcome,
    };

    let failed = |message: String| {
        let input = serde_json::to_string(&cmd).unwrap_or_default();
        ToolOutcome::provider_error("creating event", format!("{} {}", message, input))
    };

    let request = match build_request(&cmd, ctx.timezone()) {
        Ok(request) => request,
        Err(e) => return failed(e.to_string()),
    };

    match client.api().insert_event(ctx.calendar_id(), &request).await {
        Ok(created) => {
            tracing::info!(id = ?created.id, summary = %cmd.summary, "Created event");
            match serde_json::to_string_pretty(&created) {
                Ok(json) => ToolOutcome::text(format!("RESULT:\n{}", json)),
                Err(e) => ToolOutcome::Failed(e.to_string()),
            }
        }
        Err(e) => failed(e.to_string()),
    }
}
