//! Argument validation for tool calls.
//!
//! Arguments are deserialized into the tool's typed struct; a missing
//! required field or a wrong type is a schema violation. Attendee lists
//! are additionally checked to hold email addresses.

use gcal_mcp_core::DispatchError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, DispatchError> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        args => args,
    };

    serde_json::from_value(args).map_err(|e| violation(tool, e.to_string()))
}

pub fn validate_attendees(tool: &str, attendees: Option<&[String]>) -> Result<(), DispatchError> {
    for (i, email) in attendees.unwrap_or_default().iter().enumerate() {
        if !is_email(email) {
            return Err(violation(
                tool,
                format!("attendees[{}]: \"{}\" is not a valid email address", i, email),
            ));
        }
    }

    Ok(())
}

fn violation(tool: &str, reason: String) -> DispatchError {
    DispatchError::SchemaViolation {
        tool: tool.to_string(),
        reason,
    }
}

/// `local@domain.tld`, no whitespace, one `@`.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcal_mcp_google::commands::create_event::CreateEvent;
    use serde_json::json;

    #[test]
    fn test_is_email() {
        assert!(is_email("a@example.com"));
        assert!(is_email("first.last+tag@mail.example.co.uk"));

        assert!(!is_email("abc"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("a@example"));
        assert!(!is_email("a@@example.com"));
        assert!(!is_email("a@example..com"));
        assert!(!is_email("a b@example.com"));
        assert!(!is_email("a@example.com."));
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse_args::<CreateEvent>("createEvent", json!({ "summary": "Standup" }))
            .unwrap_err();

        let DispatchError::SchemaViolation { tool, reason } = err else {
            panic!("expected schema violation");
        };
        assert_eq!(tool, "createEvent");
        assert!(reason.contains("startDateTime"));
    }

    #[test]
    fn test_wrong_type() {
        let err = parse_args::<CreateEvent>(
            "createEvent",
            json!({
                "summary": "Standup",
                "startDateTime": "2025-07-10T09:00:00Z",
                "endDateTime": "2025-07-10T09:30:00Z",
                "isFullday": "yes"
            }),
        )
        .unwrap_err();

        assert!(matches!(err, DispatchError::SchemaViolation { .. }));
    }

    #[test]
    fn test_absent_arguments_are_an_empty_object() {
        let args: gcal_mcp_google::commands::list_events::ListEvents =
            parse_args("listEvents", Value::Null).unwrap();

        assert_eq!(args, Default::default());
    }

    #[test]
    fn test_bad_attendee() {
        let attendees = vec!["a@example.com".to_string(), "nope".to_string()];

        let err = validate_attendees("createEvent", Some(attendees.as_slice())).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid arguments for tool createEvent: attendees[1]: \"nope\" is not a valid email address"
        );
    }
}
