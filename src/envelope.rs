//! Wire envelope decoding and channel name handling
//!
//! Pusher frames arrive double-encoded: the outer document carries
//! `{event, channel, data}` where `data` is itself a JSON-encoded string.
//! `RawEnvelope::decode` unwraps both layers in one call.

use crate::error::{PusherError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The outer frame of a Pusher message
///
/// `data` holds JSON-encoded text, not a nested object. Handshake frames
/// (`pusher:connection_established`) carry no channel; it defaults to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEnvelope {
    /// Event-type tag (e.g., `App\Events\ChatMessageEvent`)
    pub event: String,

    /// Channel the frame was delivered on
    #[serde(default)]
    pub channel: String,

    /// Inner payload, JSON-encoded as a string
    pub data: String,
}

impl RawEnvelope {
    /// Decode a raw frame into the envelope and its parsed inner payload
    ///
    /// Fails with [`PusherError::Decode`] when either the outer or the
    /// inner JSON is malformed. Both failures are fatal to the current
    /// poll call; reconnection policy belongs to the caller.
    pub fn decode(frame: &str) -> Result<(Self, serde_json::Value)> {
        let envelope: RawEnvelope = serde_json::from_str(frame)?;
        let payload: serde_json::Value = serde_json::from_str(&envelope.data)?;
        Ok((envelope, payload))
    }
}

/// A parsed Pusher channel name
///
/// Encoding is a lossless bijection: `Chatroom(id)` ↔ `chatrooms.{id}.v2`
/// and `Channel(id)` ↔ `channel.{id}`. Parsing strips the literal prefix
/// and suffix, so ids sharing digits with the surrounding text (e.g. a
/// chatroom id ending in `2`) survive the round trip intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelName {
    /// Per-streamer chatroom channel, `chatrooms.{id}.v2`
    Chatroom(i64),
    /// Streamer presence channel, `channel.{id}`
    Channel(i64),
}

impl ChannelName {
    /// Parse a channel name, enforcing the fixed prefix/suffix contract
    ///
    /// A name that matches neither format is a protocol contract
    /// violation and yields [`PusherError::Channel`].
    pub fn parse(name: &str) -> Result<Self> {
        if let Some(rest) = name.strip_prefix("chatrooms.") {
            let digits = rest
                .strip_suffix(".v2")
                .ok_or_else(|| PusherError::Channel(name.to_string()))?;
            let id = digits
                .parse()
                .map_err(|_| PusherError::Channel(name.to_string()))?;
            return Ok(Self::Chatroom(id));
        }

        if let Some(digits) = name.strip_prefix("channel.") {
            let id = digits
                .parse()
                .map_err(|_| PusherError::Channel(name.to_string()))?;
            return Ok(Self::Channel(id));
        }

        Err(PusherError::Channel(name.to_string()))
    }

    /// The embedded entity id
    pub fn id(&self) -> i64 {
        match self {
            Self::Chatroom(id) | Self::Channel(id) => *id,
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chatroom(id) => write!(f, "chatrooms.{}.v2", id),
            Self::Channel(id) => write!(f, "channel.{}", id),
        }
    }
}
