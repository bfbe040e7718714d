//! Newline-delimited JSON framing.

use serde_json::Value;

use crate::types::{JsonRpcError, JsonRpcMessage, McpError, McpResult, RequestId};

/// Parse a single line of text as a JSON-RPC message.
///
/// Text that is not JSON is a parse error; JSON that is not a message is an
/// invalid request.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))?;
    decode_message(value)
}

/// Decode an already-parsed JSON value as a JSON-RPC message.
pub fn decode_message(value: Value) -> McpResult<JsonRpcMessage> {
    let has_id = value.get("id").is_some();
    let msg: JsonRpcMessage = serde_json::from_value(value)
        .map_err(|_| McpError::InvalidRequest("Not a valid JSON-RPC message".to_string()))?;

    // An id that fits no RequestId shape would otherwise decode as a notification.
    if has_id && matches!(msg, JsonRpcMessage::Notification(_)) {
        return Err(McpError::InvalidRequest(
            "Request id must be a string, number, or null".to_string(),
        ));
    }
    Ok(msg)
}

/// Best-effort id of a message that failed to decode, `Null` when unknown.
pub fn salvage_id(value: &Value) -> RequestId {
    value
        .get("id")
        .and_then(|id| serde_json::from_value(id.clone()).ok())
        .unwrap_or(RequestId::Null)
}

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Error response for a message that never reached the dispatcher.
pub fn error_response(error: &McpError, id: RequestId) -> McpResult<Value> {
    let response: JsonRpcError = error.to_json_rpc_error(id);
    serde_json::to_value(response).map_err(|e| McpError::InternalError(e.to_string()))
}
