//! MCP protocol types.
//!
//! Defines the JSON-RPC 2.0 messages exchanged with an MCP client over
//! stdin/stdout, one JSON document per line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision offered when the client does not name one.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Request (or notification, when `id` is absent) sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Request {
    pub fn new(id: impl Into<Value>, method: &str, params: Value) -> Self {
        Request {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id.into()),
            method: method.to_string(),
            params,
        }
    }

    pub fn notification(method: &str) -> Self {
        Request {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: method.to_string(),
            params: Value::Null,
        }
    }
}

/// Response sent back for every request that carried an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Result(Value),
    Error(RpcError),
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: Payload::Result(result),
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: Payload::Error(error),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Result(value) => Some(value),
            Payload::Error(_) => None,
        }
    }

    pub fn rpc_error(&self) -> Option<&RpcError> {
        match &self.payload {
            Payload::Error(error) => Some(error),
            Payload::Result(_) => None,
        }
    }

    /// Serialize to a single line (no trailing newline).
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    fn new(code: i64, message: impl Into<String>) -> Self {
        RpcError {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::PARSE_ERROR, format!("Parse error: {}", detail))
    }

    pub fn invalid_request(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::INVALID_REQUEST, format!("Invalid request: {}", detail))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::INVALID_PARAMS, detail.to_string())
    }

    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::INTERNAL_ERROR, format!("Internal error: {}", detail))
    }
}

// =============================================================================
// Method payloads
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: Value,
    pub server_info: Implementation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// A tool advertised in `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// The wire shape of every tool result, success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl CallToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        CallToolResult {
            content: vec![Content::Text { text: text.into() }],
        }
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().map(|c| match c {
            Content::Text { text } => text.as_str(),
        }).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result_wire_shape() {
        let value = serde_json::to_value(CallToolResult::text("hello")).unwrap();

        assert_eq!(value, json!({ "content": [{ "type": "text", "text": "hello" }] }));
    }

    #[test]
    fn test_success_response_line() {
        let response = Response::success(json!(1), json!({ "ok": true }));

        assert_eq!(
            response.to_line().unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"result":{"ok":true}}"#
        );
    }

    #[test]
    fn test_error_response_round_trips() {
        let line = Response::error(json!("a"), RpcError::method_not_found("nope"))
            .to_line()
            .unwrap();

        let parsed: Response = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed.id, json!("a"));
        assert_eq!(parsed.rpc_error().map(|e| e.code), Some(RpcError::METHOD_NOT_FOUND));
        assert!(parsed.result().is_none());
    }

    #[test]
    fn test_notification_has_no_id() {
        let request: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();

        assert!(request.id.is_none());
        assert!(request.params.is_null());
    }
}
