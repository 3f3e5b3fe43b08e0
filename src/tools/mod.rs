//! Tool catalog and dispatch.
//!
//! A static table maps each tool name to its description, input schema and
//! handler. Arguments are validated before a handler runs; once it runs,
//! every outcome (including a panic) becomes a text result.

mod args;
mod schema;

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::BoxFuture;
use gcal_mcp_core::DispatchError;
use gcal_mcp_core::protocol::{CallToolResult, Tool};
use gcal_mcp_google::commands::{
    create_event::{self, CreateEvent},
    delete_event::{self, DeleteEvent},
    get_event::{self, GetEvent},
    list_events::{self, ListEvents},
    update_event::{self, UpdateEvent},
};
use gcal_mcp_google::{CalendarContext, ToolOutcome};
use serde::Deserialize;
use serde_json::Value;

use args::{parse_args, validate_attendees};

type Handler =
    for<'a> fn(&'a CalendarContext, Value) -> Result<BoxFuture<'a, ToolOutcome>, DispatchError>;

struct ToolDef {
    name: &'static str,
    description: &'static str,
    input_schema: fn() -> Value,
    handler: Handler,
}

const TOOLS: &[ToolDef] = &[
    ToolDef {
        name: "createEvent",
        description: "Create a new event",
        input_schema: schema::create_event,
        handler: handle_create_event,
    },
    ToolDef {
        name: "listEvents",
        description: "List upcoming events from Google Calendar",
        input_schema: schema::list_events,
        handler: handle_list_events,
    },
    ToolDef {
        name: "getEvent",
        description: "Get detailed information about a specific event from Google Calendar",
        input_schema: schema::get_event,
        handler: handle_get_event,
    },
    ToolDef {
        name: "updateEvent",
        description: "Update an existing event in Google Calendar",
        input_schema: schema::update_event,
        handler: handle_update_event,
    },
    ToolDef {
        name: "deleteEvent",
        description: "Delete an existing event from Google Calendar",
        input_schema: schema::delete_event,
        handler: handle_delete_event,
    },
    ToolDef {
        name: "add",
        description: "Add two numbers",
        input_schema: schema::add,
        handler: handle_add,
    },
];

fn handle_create_event(
    ctx: &CalendarContext,
    args: Value,
) -> Result<BoxFuture<'_, ToolOutcome>, DispatchError> {
    let cmd: CreateEvent = parse_args("createEvent", args)?;
    validate_attendees("createEvent", cmd.attendees.as_deref())?;

    Ok(create_event::handle(ctx, cmd).boxed())
}

fn handle_list_events(
    ctx: &CalendarContext,
    args: Value,
) -> Result<BoxFuture<'_, ToolOutcome>, DispatchError> {
    let cmd: ListEvents = parse_args("listEvents", args)?;

    Ok(list_events::handle(ctx, cmd).boxed())
}

fn handle_get_event(
    ctx: &CalendarContext,
    args: Value,
) -> Result<BoxFuture<'_, ToolOutcome>, DispatchError> {
    let cmd: GetEvent = parse_args("getEvent", args)?;

    Ok(get_event::handle(ctx, cmd).boxed())
}

fn handle_update_event(
    ctx: &CalendarContext,
    args: Value,
) -> Result<BoxFuture<'_, ToolOutcome>, DispatchError> {
    let cmd: UpdateEvent = parse_args("updateEvent", args)?;
    validate_attendees("updateEvent", cmd.attendees.as_deref())?;

    Ok(update_event::handle(ctx, cmd).boxed())
}

fn handle_delete_event(
    ctx: &CalendarContext,
    args: Value,
) -> Result<BoxFuture<'_, ToolOutcome>, DispatchError> {
    let cmd: DeleteEvent = parse_args("deleteEvent", args)?;

    Ok(delete_event::handle(ctx, cmd).boxed())
}

#[derive(Deserialize)]
struct AddArgs {
    a: f64,
    b: f64,
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn handle_add(
    _ctx: &CalendarContext,
    args: Value,
) -> Result<BoxFuture<'_, ToolOutcome>, DispatchError> {
    let AddArgs { a, b } = parse_args("add", args)?;

    Ok(async move { ToolOutcome::text(format_number(a + b)) }.boxed())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool handler panicked".to_string()
    }
}

pub struct Dispatcher {
    ctx: CalendarContext,
}

impl Dispatcher {
    pub fn new(ctx: CalendarContext) -> Self {
        Dispatcher { ctx }
    }

    pub fn tools(&self) -> Vec<Tool> {
        TOOLS
            .iter()
            .map(|tool| Tool {
                name: tool.name.to_string(),
                description: tool.description.to_string(),
                input_schema: (tool.input_schema)(),
            })
            .collect()
    }

    /// Validate and run one tool call. `Err` means the call was rejected
    /// before its handler ran.
    pub async fn call(&self, name: &str, args: Value) -> Result<CallToolResult, DispatchError> {
        let tool = TOOLS
            .iter()
            .find(|tool| tool.name == name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        let future = (tool.handler)(&self.ctx, args)?;

        tracing::debug!(tool = name, "Calling tool");

        let outcome = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = name, %message, "Tool handler panicked");
                ToolOutcome::Failed(message)
            }
        };

        Ok(outcome.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use gcal_mcp_google::google_event::GoogleEvent;
    use gcal_mcp_google::testing::{FakeCalendar, context_with, failing_context};
    use serde_json::json;

    use super::*;

    fn dispatcher_with(calendar: Arc<FakeCalendar>) -> Dispatcher {
        Dispatcher::new(context_with(calendar))
    }

    async fn call_text(dispatcher: &Dispatcher, name: &str, args: Value) -> String {
        dispatcher
            .call(name, args)
            .await
            .unwrap()
            .first_text()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_catalog() {
        let dispatcher = Dispatcher::new(failing_context());

        let names: Vec<String> = dispatcher.tools().into_iter().map(|t| t.name).collect();

        assert_eq!(
            names,
            vec!["createEvent", "listEvents", "getEvent", "updateEvent", "deleteEvent", "add"]
        );
        for tool in dispatcher.tools() {
            assert_eq!(tool.input_schema["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_standup_is_created_with_date_times() {
        let calendar = Arc::new(FakeCalendar::default());
        let dispatcher = dispatcher_with(calendar.clone());

        let text = call_text(
            &dispatcher,
            "createEvent",
            json!({
                "summary": "Standup",
                "startDateTime": "2025-07-10T09:00:00Z",
                "endDateTime": "2025-07-10T09:30:00Z"
            }),
        )
        .await;

        assert!(text.starts_with("RESULT:\n"));
        let sent = serde_json::to_value(&calendar.inserted()[0]).unwrap();
        assert_eq!(sent["start"], json!({ "dateTime": "2025-07-10T09:00:00Z" }));
        assert_eq!(sent["end"], json!({ "dateTime": "2025-07-10T09:30:00Z" }));
        assert!(sent.get("attendees").is_none());
    }

    #[tokio::test]
    async fn test_full_day_is_created_with_dates() {
        let calendar = Arc::new(FakeCalendar::default());
        let dispatcher = dispatcher_with(calendar.clone());

        call_text(
            &dispatcher,
            "createEvent",
            json!({
                "summary": "Offsite",
                "startDateTime": "2025-07-10T00:00:00Z",
                "endDateTime": "2025-07-11T00:00:00Z",
                "isFullday": true
            }),
        )
        .await;

        let sent = &calendar.inserted()[0];
        assert_eq!(
            sent.start.as_ref().unwrap().date,
            NaiveDate::from_ymd_opt(2025, 7, 10)
        );
        assert_eq!(
            sent.end.as_ref().unwrap().date,
            NaiveDate::from_ymd_opt(2025, 7, 11)
        );
    }

    #[tokio::test]
    async fn test_delete_missing_event() {
        let dispatcher = dispatcher_with(Arc::new(FakeCalendar::default()));

        let text = call_text(&dispatcher, "deleteEvent", json!({ "eventId": "abc" })).await;

        assert_eq!(text, "Event with ID \"abc\" not found");
    }

    #[tokio::test]
    async fn test_update_with_only_id_sends_event_unchanged() {
        let event: GoogleEvent = serde_json::from_value(json!({
            "id": "a1",
            "summary": "Planning",
            "start": { "dateTime": "2025-07-10T09:00:00Z" },
            "end": { "dateTime": "2025-07-10T10:00:00Z" }
        }))
        .unwrap();
        let calendar = Arc::new(FakeCalendar::with_events(vec![event.clone()]));
        let dispatcher = dispatcher_with(calendar.clone());

        call_text(&dispatcher, "updateEvent", json!({ "eventId": "a1" })).await;

        assert_eq!(calendar.updated(), vec![("a1".to_string(), event)]);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let dispatcher = Dispatcher::new(failing_context());

        let err = dispatcher.call("teleport", json!({})).await.unwrap_err();

        assert_eq!(err, DispatchError::UnknownTool("teleport".to_string()));
    }

    #[tokio::test]
    async fn test_schema_violation_stops_before_handler() {
        let calendar = Arc::new(FakeCalendar::default());
        let dispatcher = dispatcher_with(calendar.clone());

        let err = dispatcher
            .call(
                "createEvent",
                json!({
                    "summary": "Standup",
                    "startDateTime": "2025-07-10T09:00:00Z",
                    "endDateTime": "2025-07-10T09:30:00Z",
                    "attendees": ["not-an-email"]
                }),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::SchemaViolation { .. }));
        assert!(calendar.inserted().is_empty());
    }

    #[tokio::test]
    async fn test_auth_failure_is_a_text_result() {
        let dispatcher = Dispatcher::new(failing_context());

        let text = call_text(&dispatcher, "listEvents", json!({})).await;

        assert_eq!(text, "Failed to authenticate with Google Calendar");
    }

    #[tokio::test]
    async fn test_add() {
        let dispatcher = Dispatcher::new(failing_context());

        assert_eq!(call_text(&dispatcher, "add", json!({ "a": 1, "b": 2 })).await, "3");
        assert_eq!(
            call_text(&dispatcher, "add", json!({ "a": 0.5, "b": 2 })).await,
            "2.5"
        );
    }

    #[test]
    fn test_panic_message() {
        let literal: Box<dyn std::any::Any + Send> = Box::new("boom");
        let formatted: Box<dyn std::any::Any + Send> = Box::new(format!("bad {}", 1));
        let other: Box<dyn std::any::Any + Send> = Box::new(42);

        assert_eq!(panic_message(literal.as_ref()), "boom");
        assert_eq!(panic_message(formatted.as_ref()), "bad 1");
        assert_eq!(panic_message(other.as_ref()), "tool handler panicked");
    }
}
