use serde::{Deserialize, Serialize};

use super::authed_client;
use crate::context::CalendarContext;
use crate::error::ApiError;
use crate::outcome::ToolOutcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEvent {
    pub event_id: String,
}

pub async fn handle(ctx: &CalendarContext, cmd: DeleteEvent) -> ToolOutcome {
    let client = match authed_client(ctx).await {
        Ok(client) => client,
        Err(outcome) => return outcome,
    };
    let api = client.api();
    let event_id = cmd.event_id.as_str();

    let failed = |e: ApiError| match e {
        ApiError::NotFound => ToolOutcome::NotFound {
            event_id: event_id.to_string(),
        },
        e => ToolOutcome::provider_error("deleting event", format!("{} --- {}", e, event_id)),
    };

    // Look the event up first so a missing id never reaches the delete call
    let event = match api.get_event(ctx.calendar_id(), event_id).await {
        Ok(event) => event,
        Err(e) => return failed(e),
    };

    match api.delete_event(ctx.calendar_id(), event_id).await {
        Ok(()) | Err(ApiError::Gone) => {
            tracing::info!(id = event_id, "Deleted event");
            ToolOutcome::text(format!("Successfully deleted event: \"{}\"", event.title()))
        }
        Err(e) => failed(e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::google_event::GoogleEvent;
    use crate::testing::{FakeCalendar, context_with, failing_context};

    fn event(id: &str, summary: &str) -> GoogleEvent {
        GoogleEvent {
            id: Some(id.to_string()),
            summary: Some(summary.to_string()),
            ..Default::default()
        }
    }

    fn delete(event_id: &str) -> DeleteEvent {
        DeleteEvent {
            event_id: event_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_deletes_existing_event() {
        let calendar = Arc::new(FakeCalendar::with_events(vec![event("a1", "Standup")]));
        let ctx = context_with(calendar.clone());

        let outcome = handle(&ctx, delete("a1")).await;

        assert_eq!(outcome.render(), "Successfully deleted event: \"Standup\"");
        assert_eq!(calendar.deleted(), vec!["a1".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_event_is_not_found() {
        let calendar = Arc::new(FakeCalendar::default());
        let ctx = context_with(calendar.clone());

        let outcome = handle(&ctx, delete("abc")).await;

        assert_eq!(outcome.render(), "Event with ID \"abc\" not found");
        assert!(calendar.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_gone_counts_as_deleted() {
        let calendar =
            Arc::new(FakeCalendar::with_events(vec![event("a1", "Standup")]).gone_on_delete());
        let ctx = context_with(calendar);

        let outcome = handle(&ctx, delete("a1")).await;

        assert_eq!(outcome.render(), "Successfully deleted event: \"Standup\"");
    }

    #[tokio::test]
    async fn test_provider_error_names_the_id() {
        let ctx = context_with(Arc::new(FakeCalendar::failing(403, "Forbidden")));

        let outcome = handle(&ctx, delete("a1")).await;

        assert_eq!(outcome.render(), "Error deleting event: Forbidden --- a1");
    }

    #[tokio::test]
    async fn test_auth_failure() {
        assert_eq!(
            handle(&failing_context(), delete("a1")).await,
            ToolOutcome::AuthFailure
        );
    }
}
