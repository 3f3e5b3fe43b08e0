use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::authed_client;
use super::get_event::boundary;
use crate::api::ListQuery;
use crate::context::CalendarContext;
use crate::google_event::GoogleEvent;
use crate::outcome::ToolOutcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEvents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_min: Option<String>,
}

impl ListEvents {
    fn query(&self) -> ListQuery {
        let time_min = match self.time_min.as_deref() {
            Some(time_min) if !time_min.is_empty() => time_min.to_string(),
            _ => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        ListQuery {
            time_min,
            max_results: self.max_results.clone(),
            single_events: true,
            order_by: Some("startTime".to_string()),
        }
    }
}

fn format_entry(index: usize, event: &GoogleEvent) -> String {
    let mut entry = format!(
        "{}. {} (ID: {})\nStart: {}\nEnd: {}",
        index + 1,
        event.title(),
        event.id.as_deref().unwrap_or_default(),
        boundary(&event.start),
        boundary(&event.end),
    );

    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        entry.push_str(&format!("\nDescription: {}", description));
    }

    entry
}

pub fn format_list(events: &[GoogleEvent]) -> String {
    if events.is_empty() {
        return "No upcoming events found.".to_string();
    }

    let entries: Vec<String> = events
        .iter()
        .enumerate()
        .map(|(i, event)| format_entry(i, event))
        .collect();

    format!("Upcoming {} events:\n\n{}", events.len(), entries.join("\n\n"))
}

pub async fn handle(ctx: &CalendarContext, cmd: ListEvents) -> ToolOutcome {
    let client = match authed_client(ctx).await {
        Ok(client) => client,
        Err(outcome) => return outcome,
    };

    let query = cmd.query();
    tracing::debug!(time_min = %query.time_min, max_results = ?query.max_results, "Listing events");

    match client.api().list_events(ctx.calendar_id(), &query).await {
        Ok(events) => ToolOutcome::text(format_list(&events)),
        Err(e) => ToolOutcome::provider_error("listing events", e.to_string()),
    }
}
