//! Minimal JSON-RPC 2.0 message types for the stdio transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC: &str = "2.0";

/// Incoming message. A missing `id` marks a notification, which never gets
/// a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Outgoing message, either a result or an error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Result(Response),
    Error(ErrorResponse),
}

impl Reply {
    pub fn result(id: Value, result: Value) -> Self {
        Reply::Result(Response {
            jsonrpc: JSONRPC,
            id,
            result,
        })
    }

    pub fn error(id: Value, error: ErrorBody) -> Self {
        Reply::Error(ErrorResponse {
            jsonrpc: JSONRPC,
            id,
            error,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    jsonrpc: &'static str,
    id: Value,
    result: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    jsonrpc: &'static str,
    id: Value,
    error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: i64,
    pub message: String,
}

pub fn parse_error(message: String) -> ErrorBody {
    body(-32700, message)
}

pub fn method_not_found(message: String) -> ErrorBody {
    body(-32601, message)
}

pub fn invalid_params(message: String) -> ErrorBody {
    body(-32602, message)
}

fn body(code: i64, message: String) -> ErrorBody {
    ErrorBody { code, message }
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}
