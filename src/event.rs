//! Domain events published to subscribers
//!
//! Each variant corresponds to one wire-stable event name. Variant fields
//! are ordered the way subscribers receive them, so the enum doubles as
//! the documented argument contract.

use crate::cache::{CachedChatroom, CachedUser};
use crate::envelope::RawEnvelope;
use crate::error::{PusherError, Result};
use crate::schema::{
    FollowersMode, LivestreamPayload, MessagePayload, SlowMode, UserRef,
};
use chrono::{DateTime, Utc};

/// Every published event name, in table order
///
/// This is the public surface subscribers key on; the names are
/// wire-stable and never renamed.
pub const EVENT_NAMES: [&str; 19] = [
    "message",
    "livestream_start",
    "livestream_end",
    "follow",
    "unfollow",
    "timeout",
    "ban",
    "untimeout",
    "unban",
    "chatroom_clear",
    "subscription",
    "pinnedmessage_create",
    "pinnedmessage_clear",
    "chatroom_update",
    "chatroom_subscribe",
    "channel_subscribe",
    "connection_establish",
    "payload_receive",
    "raw_payload_receive",
];

/// A named, typed notification produced by the router
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// `message` — a chat message arrived
    Message(MessagePayload),

    /// `livestream_start` — the streamer went live
    LivestreamStart(LivestreamPayload),

    /// `livestream_end` — the broadcast stopped
    LivestreamEnd(LivestreamPayload),

    /// `follow` — a watched user gained a follower (counter already bumped)
    Follow(CachedUser),

    /// `unfollow` — a watched user lost a follower (counter already bumped)
    Unfollow(CachedUser),

    /// `timeout` — a temporary ban with a parsed expiry
    Timeout {
        user: UserRef,
        chatroom: Option<CachedChatroom>,
        banned_by: String,
        expires_at: DateTime<Utc>,
    },

    /// `ban` — a permanent ban
    Ban {
        user: UserRef,
        chatroom: Option<CachedChatroom>,
        banned_by: String,
    },

    /// `untimeout` — a temporary ban lifted
    Untimeout {
        user: UserRef,
        chatroom: Option<CachedChatroom>,
        unbanned_by: String,
    },

    /// `unban` — a permanent ban lifted
    Unban {
        user: UserRef,
        chatroom: Option<CachedChatroom>,
        unbanned_by: String,
    },

    /// `chatroom_clear` — chat history wiped; carries local arrival time
    ChatroomClear {
        chatroom: Option<CachedChatroom>,
        cleared_at: DateTime<Utc>,
    },

    /// `subscription` — a viewer (re)subscribed
    Subscription {
        username: String,
        months: i64,
        chatroom: Option<CachedChatroom>,
    },

    /// `pinnedmessage_create` — a message was pinned
    PinnedMessageCreate {
        chatroom: Option<CachedChatroom>,
        content: String,
        created_at: DateTime<Utc>,
        sender: String,
        duration: String,
        kind: String,
    },

    /// `pinnedmessage_clear` — the pinned message was removed
    PinnedMessageClear { chatroom: Option<CachedChatroom> },

    /// `chatroom_update` — chat mode settings changed
    ChatroomUpdate {
        slow_mode: SlowMode,
        subscribers_mode: bool,
        followers_mode: FollowersMode,
        emotes_mode: bool,
        advanced_bot_protection: bool,
    },

    /// `chatroom_subscribe` — the server confirmed a chatroom subscription
    ChatroomSubscribe { chatroom: Option<CachedChatroom> },

    /// `channel_subscribe` — the server confirmed a channel watch
    ChannelSubscribe { user: Option<CachedUser> },

    /// `connection_establish` — the Pusher handshake completed
    ConnectionEstablish(serde_json::Value),

    /// `payload_receive` — unconditional pass-through of every decoded frame
    PayloadReceive {
        tag: String,
        payload: serde_json::Value,
    },

    /// `raw_payload_receive` — unconditional pass-through of every envelope
    RawPayloadReceive(RawEnvelope),
}

impl DomainEvent {
    /// The wire-stable event name subscribers key on
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::LivestreamStart(_) => "livestream_start",
            Self::LivestreamEnd(_) => "livestream_end",
            Self::Follow(_) => "follow",
            Self::Unfollow(_) => "unfollow",
            Self::Timeout { .. } => "timeout",
            Self::Ban { .. } => "ban",
            Self::Untimeout { .. } => "untimeout",
            Self::Unban { .. } => "unban",
            Self::ChatroomClear { .. } => "chatroom_clear",
            Self::Subscription { .. } => "subscription",
            Self::PinnedMessageCreate { .. } => "pinnedmessage_create",
            Self::PinnedMessageClear { .. } => "pinnedmessage_clear",
            Self::ChatroomUpdate { .. } => "chatroom_update",
            Self::ChatroomSubscribe { .. } => "chatroom_subscribe",
            Self::ChannelSubscribe { .. } => "channel_subscribe",
            Self::ConnectionEstablish(_) => "connection_establish",
            Self::PayloadReceive { .. } => "payload_receive",
            Self::RawPayloadReceive(_) => "raw_payload_receive",
        }
    }
}

/// Parse an ISO-8601 timestamp as delivered on the wire
///
/// Kick timestamps arrive as RFC 3339 (`2023-02-03T23:09:34.000000Z` or
/// with an explicit offset). Anything else is a malformed payload.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| PusherError::Timestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_names_are_wire_stable() {
        let chatroom = Some(CachedChatroom {
            id: 1,
            streamer: "s".into(),
        });
        let user = UserRef {
            id: 1,
            username: "u".into(),
        };

        let cases: Vec<(DomainEvent, &str)> = vec![
            (
                DomainEvent::ChatroomClear {
                    chatroom: chatroom.clone(),
                    cleared_at: Utc::now(),
                },
                "chatroom_clear",
            ),
            (
                DomainEvent::Ban {
                    user: user.clone(),
                    chatroom: chatroom.clone(),
                    banned_by: "mod".into(),
                },
                "ban",
            ),
            (
                DomainEvent::PinnedMessageClear { chatroom },
                "pinnedmessage_clear",
            ),
            (
                DomainEvent::ChannelSubscribe { user: None },
                "channel_subscribe",
            ),
            (
                DomainEvent::PayloadReceive {
                    tag: "t".into(),
                    payload: serde_json::json!({}),
                },
                "payload_receive",
            ),
            (
                DomainEvent::ConnectionEstablish(serde_json::json!({})),
                "connection_establish",
            ),
        ];

        for (event, name) in cases {
            assert_eq!(event.name(), name);
        }
    }

    #[test]
    fn test_parse_timestamp_utc_suffix() {
        let parsed = parse_timestamp("2023-02-03T23:09:34.000000Z").unwrap();
        assert_eq!(parsed.hour(), 23);
        assert_eq!(parsed.minute(), 9);
    }

    #[test]
    fn test_parse_timestamp_explicit_offset() {
        let parsed = parse_timestamp("2024-01-01T02:05:00+02:00").unwrap();
        // Normalized to UTC
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.minute(), 5);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("five minutes from now").unwrap_err();
        assert!(matches!(err, PusherError::Timestamp(_)));
    }
}
