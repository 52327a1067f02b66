// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-RPC 2.0 wire types shared by the protocol codec and the router.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC error codes, standard range plus the Atlas extension range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    DependencyMissing,
    CollectionNotFound,
    BackendUnavailable,
    FileNotFound,
    IngestionFailed,
    SearchFailed,
}

impl ErrorCode {
    pub const fn code(self) -> i64 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::DependencyMissing => -32000,
            ErrorCode::CollectionNotFound => -32001,
            ErrorCode::BackendUnavailable => -32002,
            ErrorCode::FileNotFound => -32003,
            ErrorCode::IngestionFailed => -32004,
            ErrorCode::SearchFailed => -32005,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::DependencyMissing => "Dependency missing",
            ErrorCode::CollectionNotFound => "Collection not found",
            ErrorCode::BackendUnavailable => "Backend unavailable",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::IngestionFailed => "Ingestion failed",
            ErrorCode::SearchFailed => "Search failed",
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: None,
        }
    }

    pub fn with_data(code: ErrorCode, data: impl Serialize) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: serde_json::to_value(data).ok(),
        }
    }

    /// An internal error carrying the failing handler's message, never a stack trace.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InternalError.code(),
            message: ErrorCode::InternalError.message().to_string(),
            data: Some(Value::String(message.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_spec_ranges() {
        assert_eq!(ErrorCode::ParseError.code(), -32700);
        assert_eq!(ErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(ErrorCode::InvalidParams.code(), -32602);
        assert_eq!(ErrorCode::InternalError.code(), -32603);
        assert_eq!(ErrorCode::DependencyMissing.code(), -32000);
        assert_eq!(ErrorCode::CollectionNotFound.code(), -32001);
        assert_eq!(ErrorCode::BackendUnavailable.code(), -32002);
        assert_eq!(ErrorCode::FileNotFound.code(), -32003);
        assert_eq!(ErrorCode::IngestionFailed.code(), -32004);
        assert_eq!(ErrorCode::SearchFailed.code(), -32005);
    }

    #[test]
    fn internal_error_carries_message_not_stack() {
        let err = RpcError::internal("boom");
        assert_eq!(err.data, Some(Value::String("boom".to_string())));
    }
}
