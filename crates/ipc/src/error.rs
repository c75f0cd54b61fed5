//! Error types for the viewer protocol.

/// Errors raised while encoding or decoding protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Invalid message format: {0}")]
    InvalidFormat(String),
}
