//! JSON-RPC envelope representations and wire encoding
//!
//! Only single request/response pairs are modelled. Ids and payloads are kept as opaque
//! `serde_json::Value`s so any shape a test supplies passes through untouched.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{DecodeError, EncodeError};

/// Id written back when the request body could not be parsed.
pub const PARSE_FAILURE_ID: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    /// `None` when the field is absent, `Some(Value::Null)` for an explicit `null`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Exactly one of `result` and `error` is set; use the constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub id: Value,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: ErrorPayload) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn parse_failure(err: &DecodeError) -> Self {
        Self::failure(Value::from(PARSE_FAILURE_ID), error_payload(err))
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// Only runs when the field is present, so an explicit `null` stays distinguishable.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

pub fn error_payload(err: &impl Display) -> ErrorPayload {
    ErrorPayload {
        message: err.to_string(),
    }
}

pub fn decode_request(body: &[u8]) -> Result<RpcRequest, DecodeError> {
    Ok(serde_json::from_slice(body)?)
}

/// Serializes a response followed by a newline.
pub fn encode_response(response: &RpcResponse) -> Result<Vec<u8>, EncodeError> {
    let mut body =
        serde_json::to_vec(response).map_err(|err| EncodeError::new("response", err))?;
    body.push(b'\n');
    Ok(body)
}
