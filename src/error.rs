//! Error types for kick-event

use thiserror::Error;

/// Errors that can occur in the ingestion and dispatch engine
#[derive(Debug, Error)]
pub enum PusherError {
    /// Websocket connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Underlying websocket transport error
    #[error("Websocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    /// Malformed outer or inner JSON in a received frame
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Channel name violating the fixed prefix/suffix contract
    #[error("Malformed channel name: '{0}'")]
    Channel(String),

    /// Payload missing or mistyping a field required by its event tag
    #[error("Malformed '{tag}' payload: {reason}")]
    Payload { tag: String, reason: String },

    /// Unparsable ISO-8601 timestamp in a payload
    #[error("Invalid timestamp: '{0}'")]
    Timestamp(String),

    /// Control frame send failure
    #[error("Failed to send control frame for channel '{channel}': {reason}")]
    Send { channel: String, reason: String },

    /// Operation attempted on a closed connection
    #[error("Connection is closed")]
    Closed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PusherError>;
