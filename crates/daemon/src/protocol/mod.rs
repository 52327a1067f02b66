// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC 2.0 over newline-delimited JSON.
//!
//! Wire format: one JSON object per line, `\n`-terminated. A message is
//! first parsed as [`serde_json::Value`] and then classified by the
//! presence of `id`/`method` before being deserialized into its concrete
//! shape — there is no `serde(untagged)` discrimination here because the
//! three message kinds (request, notification, response) are
//! distinguished structurally, not by a tag field.

mod codec;

pub use codec::{read_line, ReadError};

use atlas_core::{ErrorCode, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// A parsed inbound line, before dispatch.
#[derive(Debug, Clone)]
pub enum InboundMessage {
    Request(RpcRequest),
    /// A response object received from a client; the core never expects
    /// these (clients only send requests) so they are logged and dropped.
    StrayResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(flatten)]
    pub payload: RpcResponsePayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RpcResponsePayload {
    Result { result: Value },
    Error { error: RpcErrorBody },
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<RpcError> for RpcErrorBody {
    fn from(err: RpcError) -> Self {
        Self {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            payload: RpcResponsePayload::Result { result },
        }
    }

    pub fn error(id: Value, err: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            payload: RpcResponsePayload::Error { error: err.into() },
        }
    }
}

/// A server-pushed event notification: no `id`, fixed `method: "event"`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcNotification {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: NotificationParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationParams {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
}

impl RpcNotification {
    pub fn for_event(event: &atlas_core::Event) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: "event",
            params: NotificationParams {
                event_type: event.event_type.clone(),
                data: event.data.clone(),
            },
        }
    }
}

/// Classify and parse one newline-delimited JSON line.
///
/// Returns `Err` with a salvaged `id` (when one was present in the raw
/// JSON) so the caller can still produce a `ParseError` response per
/// the transport's framing contract.
pub fn parse_line(line: &str) -> Result<InboundMessage, (Option<Value>, RpcError)> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        (
            None,
            RpcError::with_data(ErrorCode::ParseError, format!("invalid JSON: {e}")),
        )
    })?;

    let Some(obj) = value.as_object() else {
        return Err((
            None,
            RpcError::with_data(ErrorCode::InvalidRequest, "message must be a JSON object"),
        ));
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        let id = obj.get("id").cloned();
        return Err((
            id,
            RpcError::with_data(ErrorCode::InvalidRequest, "missing or wrong \"jsonrpc\" version"),
        ));
    }

    let has_method = obj.contains_key("method");
    let has_id = obj.contains_key("id");

    if has_method && has_id {
        let id = obj.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<RpcRequest>(value) {
            Ok(request) => Ok(InboundMessage::Request(request)),
            Err(e) => Err((
                Some(id),
                RpcError::with_data(ErrorCode::InvalidRequest, format!("malformed request: {e}")),
            )),
        }
    } else if has_method {
        // Notification from a client: the core defines no client-to-server
        // notifications, so this is treated as an unrecognized request with
        // no id to reply to — silently ignored per the codec's framing note.
        Err((
            None,
            RpcError::with_data(ErrorCode::InvalidRequest, "unexpected client notification"),
        ))
    } else if has_id {
        Ok(InboundMessage::StrayResponse)
    } else {
        Err((
            None,
            RpcError::with_data(ErrorCode::InvalidRequest, "message has neither \"method\" nor \"id\""),
        ))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
