//! JSON-RPC 2.0 message handling for the MCP tool surface.
//!
//! Transport independent: a message goes in, at most one response comes out.
//! Requests without an `id` are notifications and never get a response.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::tools::Toolset;
use crate::error::ToolError;

/// Protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

fn default_jsonrpc() -> String {
    "2.0".to_string()
}

/// An incoming request or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Notifications carry no id.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// A response carrying either `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: default_jsonrpc(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Handle one raw message.
///
/// Unparseable input yields a parse error response with a null id.
pub async fn handle_message(toolset: &Toolset, message: &str) -> Option<JsonRpcResponse> {
    match serde_json::from_str::<JsonRpcRequest>(message) {
        Ok(request) => handle_request(toolset, request).await,
        Err(e) => {
            tracing::warn!(error = %e, "Received unparseable message");
            Some(JsonRpcResponse::error(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {e}"),
            ))
        }
    }
}

/// Dispatch a parsed request.
pub async fn handle_request(toolset: &Toolset, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    let Some(id) = request.id else {
        tracing::debug!(method = %request.method, "Received notification");
        return None;
    };

    tracing::debug!(method = %request.method, "Handling request");

    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(id, initialize_result(toolset)),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(id, list_tools(toolset)),
        "tools/call" => call_tool(toolset, id, request.params).await,
        other => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
    };
    Some(response)
}

fn initialize_result(toolset: &Toolset) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": toolset.kind().server_name(),
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

fn list_tools(toolset: &Toolset) -> Value {
    let tools: Vec<Value> = toolset
        .tools()
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name(),
                "description": tool.description(),
                "inputSchema": tool.schema(),
            })
        })
        .collect();
    json!({ "tools": tools })
}

async fn call_tool(toolset: &Toolset, id: Value, params: Value) -> JsonRpcResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name");
    };
    let Some(tool) = toolset.find(name) else {
        return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Unknown tool: {name}"));
    };

    let args = params.get("arguments").cloned().unwrap_or(Value::Null);
    let result = tool.call(args).await;
    if let Err(e) = &result {
        tracing::warn!(tool = name, error = %e, "Tool call failed");
    }
    JsonRpcResponse::success(id, call_result(result))
}

/// Shape a tool outcome as an MCP `tools/call` result.
///
/// Strings become plain text content. Other JSON is pretty-printed as text,
/// and objects are also attached as `structuredContent`. Errors are reported
/// in-band with `isError` set.
#[must_use]
pub fn call_result(result: Result<Value, ToolError>) -> Value {
    match result {
        Ok(Value::String(text)) => json!({
            "content": [{ "type": "text", "text": text }],
            "isError": false,
        }),
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
            let mut result = json!({
                "content": [{ "type": "text", "text": text }],
                "isError": false,
            });
            if value.is_object() {
                result["structuredContent"] = value;
            }
            result
        }
        Err(e) => json!({
            "content": [{ "type": "text", "text": e.to_string() }],
            "isError": true,
        }),
    }
}
