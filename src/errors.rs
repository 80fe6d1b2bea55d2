use thiserror::Error;

/// Request body could not be read as a JSON-RPC request envelope.
#[derive(Debug, Error)]
#[error("failed to parse request body: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// Outgoing payload could not be serialized.
#[derive(Debug, Error)]
#[error("failed to encode {what}: {source}")]
pub struct EncodeError {
    pub what: &'static str,
    #[source]
    pub source: serde_json::Error,
}

impl EncodeError {
    pub fn new(what: &'static str, source: serde_json::Error) -> Self {
        Self { what, source }
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler reported a failure; the message is surfaced verbatim.
    #[error("{0}")]
    Failed(String),
    #[error("handler for {method} panicked: {message}")]
    Panicked { method: String, message: String },
    /// The handler's return value could not be converted to JSON.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
