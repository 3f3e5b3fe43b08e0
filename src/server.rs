//! MCP server loop over newline-delimited JSON-RPC.
//!
//! One request is read, handled to completion and answered before the next
//! line is read. Notifications get no reply.

use anyhow::{Context, Result};
use gcal_mcp_core::protocol::{
    CallToolParams, Implementation, InitializeResult, LATEST_PROTOCOL_VERSION, ListToolsResult,
    Request, Response, RpcError,
};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::tools::Dispatcher;

pub const SERVER_NAME: &str = "gcal-mcp";

/// Serve until `reader` reaches EOF.
pub async fn serve<R, W>(reader: R, mut writer: W, dispatcher: &Dispatcher) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }

        let Some(response) = handle_line(&line, dispatcher).await else {
            continue;
        };

        let mut out = response.to_line().context("Failed to serialize response")?;
        out.push('\n');
        writer
            .write_all(out.as_bytes())
            .await
            .context("Failed to write response")?;
        writer.flush().await.context("Failed to flush response")?;
    }

    tracing::info!("Input closed, shutting down");

    Ok(())
}

async fn handle_line(line: &str, dispatcher: &Dispatcher) -> Option<Response> {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable request");
            return Some(Response::error(Value::Null, RpcError::parse_error(e)));
        }
    };

    let request: Request = match serde_json::from_value(value.clone()) {
        Ok(request) => request,
        Err(e) => {
            let id = value.get("id").cloned().unwrap_or(Value::Null);
            return Some(Response::error(id, RpcError::invalid_request(e)));
        }
    };

    let Some(id) = request.id else {
        tracing::debug!(method = %request.method, "Notification");
        return None;
    };

    let response = match dispatch(&request.method, request.params, dispatcher).await {
        Ok(result) => Response::success(id, result),
        Err(error) => {
            tracing::debug!(method = %request.method, code = error.code, message = %error.message, "Request failed");
            Response::error(id, error)
        }
    };

    Some(response)
}

fn to_result(value: impl Serialize) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(RpcError::internal_error)
}

async fn dispatch(method: &str, params: Value, dispatcher: &Dispatcher) -> Result<Value, RpcError> {
    match method {
        "initialize" => {
            let protocol_version = params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(LATEST_PROTOCOL_VERSION);

            to_result(InitializeResult {
                protocol_version: protocol_version.to_string(),
                capabilities: json!({ "tools": { "listChanged": false } }),
                server_info: Implementation {
                    name: SERVER_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            })
        }
        "ping" => Ok(json!({})),
        "tools/list" => to_result(ListToolsResult {
            tools: dispatcher.tools(),
        }),
        "tools/call" => {
            let params: CallToolParams =
                serde_json::from_value(params).map_err(RpcError::invalid_params)?;

            tracing::info!(tool = %params.name, "tools/call");

            let result = dispatcher
                .call(&params.name, params.arguments)
                .await
                .map_err(RpcError::invalid_params)?;

            to_result(result)
        }
        _ => Err(RpcError::method_not_found(method)),
    }
}
