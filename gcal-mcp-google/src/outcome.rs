//! What a tool call produced, rendered to protocol text in one place.

use gcal_mcp_core::protocol::CallToolResult;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Text(String),
    NotFound { event_id: String },
    AuthFailure,
    ProviderError { action: &'static str, detail: String },
    /// Unexpected failure inside a handler
    Failed(String),
}

impl ToolOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        ToolOutcome::Text(text.into())
    }

    pub fn provider_error(action: &'static str, detail: impl Into<String>) -> Self {
        ToolOutcome::ProviderError {
            action,
            detail: detail.into(),
        }
    }

    /// Map an API error to the not-found outcome for 404s, else a provider
    /// error for `action`.
    pub fn from_lookup(err: ApiError, event_id: &str, action: &'static str) -> Self {
        match err {
            ApiError::NotFound => ToolOutcome::NotFound {
                event_id: event_id.to_string(),
            },
            err => ToolOutcome::provider_error(action, err.to_string()),
        }
    }

    pub fn render(&self) -> String {
        match self {
            ToolOutcome::Text(text) => text.clone(),
            ToolOutcome::NotFound { event_id } => format!("Event with ID \"{}\" not found", event_id),
            ToolOutcome::AuthFailure => "Failed to authenticate with Google Calendar".to_string(),
            ToolOutcome::ProviderError { action, detail } => format!("Error {}: {}", action, detail),
            ToolOutcome::Failed(message) => format!("Error: {}", message),
        }
    }
}

impl From<ToolOutcome> for CallToolResult {
    fn from(outcome: ToolOutcome) -> Self {
        CallToolResult::text(outcome.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders() {
        assert_eq!(
            ToolOutcome::NotFound {
                event_id: "abc".to_string()
            }
            .render(),
            "Event with ID \"abc\" not found"
        );
        assert_eq!(
            ToolOutcome::AuthFailure.render(),
            "Failed to authenticate with Google Calendar"
        );
        assert_eq!(
            ToolOutcome::provider_error("listing events", "Backend Error").render(),
            "Error listing events: Backend Error"
        );
        assert_eq!(ToolOutcome::Failed("boom".to_string()).render(), "Error: boom");
    }

    #[test]
    fn test_lookup_distinguishes_not_found() {
        assert_eq!(
            ToolOutcome::from_lookup(ApiError::NotFound, "abc", "retrieving event"),
            ToolOutcome::NotFound {
                event_id: "abc".to_string()
            }
        );
        assert_eq!(
            ToolOutcome::from_lookup(ApiError::Gone, "abc", "retrieving event").render(),
            "Error retrieving event: Resource has been deleted"
        );
    }

    #[test]
    fn test_into_call_tool_result() {
        let result: CallToolResult = ToolOutcome::text("hello").into();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({ "content": [{ "type": "text", "text": "hello" }] })
        );
    }
}
