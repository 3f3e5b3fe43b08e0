//! JSON Schemas advertised in `tools/list`.

use serde_json::{Value, json};

pub fn create_event() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "The title/summary of the event"
            },
            "startDateTime": {
                "type": "string",
                "description": "Start date and time in ISO format (e.g., '2025-07-10T12:30:00Z')"
            },
            "endDateTime": {
                "type": "string",
                "description": "End date and time in ISO format (e.g., '2025-07-10T14:30:00Z')"
            },
            "attendees": {
                "type": "array",
                "items": { "type": "string", "format": "email" },
                "description": "List of attendee email addresses"
            },
            "description": {
                "type": "string",
                "description": "Optional description for the event"
            },
            "isFullday": {
                "type": "boolean",
                "description": "Is the event a full day event"
            }
        },
        "required": ["summary", "startDateTime", "endDateTime"]
    })
}

pub fn list_events() -> Value {
    json!({
        "type": "object",
        "properties": {
            "maxResults": {
                "type": "number",
                "description": "The maximum number of events to return"
            },
            "timeMin": {
                "type": "string",
                "description": "The minimum time to return events for"
            }
        }
    })
}

fn event_id(verb: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "eventId": {
                "type": "string",
                "description": format!(
                    "The unique ID of the event to {} (you can get this from listEvents)",
                    verb
                )
            }
        },
        "required": ["eventId"]
    })
}

pub fn get_event() -> Value {
    event_id("get")
}

pub fn delete_event() -> Value {
    event_id("delete")
}

pub fn update_event() -> Value {
    json!({
        "type": "object",
        "properties": {
            "eventId": {
                "type": "string",
                "description": "The unique ID of the event to update (you can get this from listEvents)"
            },
            "summary": {
                "type": "string",
                "description": "The new title/summary of the event"
            },
            "startDateTime": {
                "type": "string",
                "description": "New start date and time in ISO format (e.g., '2025-07-10T12:30:00Z')"
            },
            "endDateTime": {
                "type": "string",
                "description": "New end date and time in ISO format (e.g., '2025-07-10T14:30:00Z')"
            },
            "attendees": {
                "type": "array",
                "items": { "type": "string", "format": "email" },
                "description": "List of attendee email addresses (replaces existing attendees)"
            },
            "description": {
                "type": "string",
                "description": "New description for the event"
            },
            "location": {
                "type": "string",
                "description": "New location for the event"
            },
            "isFullday": {
                "type": "boolean",
                "description": "Is the event a full day event"
            }
        },
        "required": ["eventId"]
    })
}

pub fn add() -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": { "type": "number" },
            "b": { "type": "number" }
        },
        "required": ["a", "b"]
    })
}
