//! Event tags and per-tag payload schemas
//!
//! Every recognized event-type tag has an explicit serde schema, so a
//! malformed payload fails at decode time instead of at first field
//! access. Field names follow the Kick wire format (snake_case).

use serde::{Deserialize, Serialize};

/// The closed set of recognized event-type tags
///
/// Unknown tag strings parse to `None` and are ignored by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    ChatMessage,
    StreamerIsLive,
    StopStreamBroadcast,
    FollowersUpdated,
    UserBanned,
    UserUnbanned,
    ChatroomClear,
    Subscription,
    PinnedMessageCreated,
    PinnedMessageDeleted,
    ChatroomUpdated,
    SubscriptionSucceeded,
    ConnectionEstablished,
}

impl EventTag {
    /// Map a wire tag string onto the closed tag set
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "App\\Events\\ChatMessageEvent" => Some(Self::ChatMessage),
            "App\\Events\\StreamerIsLive" => Some(Self::StreamerIsLive),
            "App\\Events\\StopStreamBroadcast" => Some(Self::StopStreamBroadcast),
            "App\\Events\\FollowersUpdated" => Some(Self::FollowersUpdated),
            "App\\Events\\UserBannedEvent" => Some(Self::UserBanned),
            "App\\Events\\UserUnbannedEvent" => Some(Self::UserUnbanned),
            "App\\Events\\ChatroomClearEvent" => Some(Self::ChatroomClear),
            "App\\Events\\SubscriptionEvent" => Some(Self::Subscription),
            "App\\Events\\PinnedMessageCreatedEvent" => Some(Self::PinnedMessageCreated),
            "App\\Events\\PinnedMessageDeletedEvent" => Some(Self::PinnedMessageDeleted),
            "App\\Events\\ChatroomUpdatedEvent" => Some(Self::ChatroomUpdated),
            "pusher_internal:subscription_succeeded" => Some(Self::SubscriptionSucceeded),
            "pusher:connection_established" => Some(Self::ConnectionEstablished),
            _ => None,
        }
    }
}

/// Minimal user reference embedded in moderation payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

/// Moderation actor reference — only the username is guaranteed on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub username: String,
}

/// Chat message sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderPayload {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub slug: String,
}

/// `ChatMessageEvent` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: String,
    pub chatroom_id: i64,
    pub content: String,
    pub created_at: String,
    pub sender: SenderPayload,
}

/// Wrapper for payloads nesting the livestream under `livestream`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivestreamEnvelope {
    pub livestream: LivestreamPayload,
}

/// Partial livestream as delivered by `StreamerIsLive` / `StopStreamBroadcast`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivestreamPayload {
    pub id: i64,
    #[serde(default)]
    pub channel_id: i64,
    #[serde(default)]
    pub session_title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `FollowersUpdated` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowersUpdatedPayload {
    pub channel_id: i64,
    pub followed: bool,
    #[serde(default)]
    pub followers_count: Option<i64>,
}

/// `UserBannedEvent` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannedPayload {
    pub user: UserRef,
    pub banned_by: ActorRef,
    #[serde(default)]
    pub permanent: bool,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// `UserUnbannedEvent` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbannedPayload {
    pub user: UserRef,
    pub unbanned_by: ActorRef,
    #[serde(default)]
    pub permanent: bool,
}

/// `SubscriptionEvent` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPayload {
    pub chatroom_id: i64,
    pub username: String,
    pub months: i64,
}

/// `PinnedMessageCreatedEvent` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedMessageCreatedPayload {
    pub message: PinnedMessageBody,
    /// Pin duration as delivered (minutes, or empty for indefinite)
    #[serde(default)]
    pub duration: String,
}

/// The pinned message itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedMessageBody {
    pub chatroom_id: i64,
    pub content: String,
    pub created_at: String,
    pub sender: SenderPayload,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// `ChatroomUpdatedEvent` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatroomUpdatedPayload {
    pub id: i64,
    pub slow_mode: SlowMode,
    pub subscribers_mode: ToggleMode,
    pub followers_mode: FollowersMode,
    pub emotes_mode: ToggleMode,
    pub advanced_bot_protection: ToggleMode,
}

/// Slow-mode setting with its message interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowMode {
    pub enabled: bool,
    #[serde(default)]
    pub message_interval: i64,
}

/// Followers-only setting with its minimum follow age (minutes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowersMode {
    pub enabled: bool,
    #[serde(default)]
    pub min_duration: i64,
}

/// A bare on/off chatroom mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleMode {
    pub enabled: bool,
}
