//! The per-connection receive loop and subscription control
//!
//! `PusherSocket` ties one transport to its entity cache and dispatcher:
//! a single-threaded cooperative loop whose only suspension point is the
//! blocking receive. Each frame is fully decoded, routed, and dispatched
//! before the next receive begins, which is what makes the router's
//! cache-mutation-plus-dispatch sequences indivisible.

use crate::cache::EntityCache;
use crate::dispatch::Dispatcher;
use crate::envelope::{ChannelName, RawEnvelope};
use crate::error::Result;
use crate::event::DomainEvent;
use crate::router;
use crate::transport::FrameTransport;
use serde::{Deserialize, Serialize};

/// A `pusher:subscribe` / `pusher:unsubscribe` control frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFrame {
    pub event: String,
    pub data: ControlData,
}

/// Channel handshake body; `auth` stays empty for public channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlData {
    pub auth: String,
    pub channel: String,
}

impl ControlFrame {
    /// Compose a subscribe frame for a channel
    pub fn subscribe(channel: ChannelName) -> Self {
        Self {
            event: "pusher:subscribe".to_string(),
            data: ControlData {
                auth: String::new(),
                channel: channel.to_string(),
            },
        }
    }

    /// Compose an unsubscribe frame for a channel
    pub fn unsubscribe(channel: ChannelName) -> Self {
        Self {
            event: "pusher:unsubscribe".to_string(),
            data: ControlData {
                auth: String::new(),
                channel: channel.to_string(),
            },
        }
    }
}

/// One Pusher connection with its cache, dispatcher, and control surface
pub struct PusherSocket<T: FrameTransport> {
    transport: T,
    cache: EntityCache,
    dispatcher: Dispatcher,
}

impl<T: FrameTransport> PusherSocket<T> {
    /// Wrap a connected transport with an empty cache
    pub fn new(transport: T) -> Self {
        Self::with_cache(transport, EntityCache::new())
    }

    /// Wrap a connected transport with pre-seeded entity state
    pub fn with_cache(transport: T, cache: EntityCache) -> Self {
        Self {
            transport,
            cache,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Register a subscriber for a named domain event
    pub fn on(&mut self, name: impl Into<String>, handler: impl FnMut(&DomainEvent) + Send + 'static) {
        self.dispatcher.subscribe(name, handler);
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut EntityCache {
        &mut self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    /// Receive and route one frame
    ///
    /// Returns `Ok(false)` once the connection has closed. Decode and
    /// routing failures propagate; reconnection policy is the caller's.
    pub async fn poll_event(&mut self) -> Result<bool> {
        let Some(frame) = self.transport.recv().await? else {
            return Ok(false);
        };

        let (envelope, payload) = RawEnvelope::decode(&frame)?;
        router::route(&envelope, &payload, &mut self.cache, &mut self.dispatcher)?;
        Ok(true)
    }

    /// Poll until the connection closes
    pub async fn run(&mut self) -> Result<()> {
        while !self.transport.is_closed() {
            if !self.poll_event().await? {
                break;
            }
        }
        tracing::info!("Receive loop finished");
        Ok(())
    }

    /// Subscribe to a chatroom's `chatrooms.{id}.v2` channel
    pub async fn subscribe_chatroom(&mut self, chatroom_id: i64) -> Result<()> {
        self.send_control(ControlFrame::subscribe(ChannelName::Chatroom(chatroom_id)))
            .await
    }

    /// Unsubscribe from a chatroom channel
    pub async fn unsubscribe_chatroom(&mut self, chatroom_id: i64) -> Result<()> {
        self.send_control(ControlFrame::unsubscribe(ChannelName::Chatroom(chatroom_id)))
            .await
    }

    /// Watch a streamer's `channel.{id}` channel
    pub async fn watch_channel(&mut self, channel_id: i64) -> Result<()> {
        self.send_control(ControlFrame::subscribe(ChannelName::Channel(channel_id)))
            .await
    }

    /// Stop watching a streamer's channel
    ///
    /// Sends a subscribe frame, matching the behavior observed on the
    /// live web client. Kept as-is pending confirmation upstream.
    pub async fn unwatch_channel(&mut self, channel_id: i64) -> Result<()> {
        self.send_control(ControlFrame::subscribe(ChannelName::Channel(channel_id)))
            .await
    }

    /// Close the connection; the loop terminates on the next poll
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    async fn send_control(&mut self, frame: ControlFrame) -> Result<()> {
        tracing::debug!(event = %frame.event, channel = %frame.data.channel, "Sending control frame");
        let text = serde_json::to_string(&frame)?;
        self.transport.send(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedUser;
    use crate::transport::MemoryTransport;
    use std::sync::{Arc, Mutex};

    fn wire(envelope_event: &str, channel: &str, inner: serde_json::Value) -> String {
        serde_json::json!({
            "event": envelope_event,
            "channel": channel,
            "data": inner.to_string(),
        })
        .to_string()
    }

    #[test]
    fn test_subscribe_frame_shape() {
        let frame = ControlFrame::subscribe(ChannelName::Chatroom(42));
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"event":"pusher:subscribe","data":{"auth":"","channel":"chatrooms.42.v2"}}"#
        );
    }

    #[test]
    fn test_unsubscribe_frame_shape() {
        let frame = ControlFrame::unsubscribe(ChannelName::Channel(7));
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"event":"pusher:unsubscribe","data":{"auth":"","channel":"channel.7"}}"#
        );
    }

    #[tokio::test]
    async fn test_subscription_control_sends() {
        let mut socket = PusherSocket::new(MemoryTransport::default());

        socket.subscribe_chatroom(42).await.unwrap();
        socket.unsubscribe_chatroom(42).await.unwrap();
        socket.watch_channel(7).await.unwrap();

        let sent = socket.transport().sent();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].contains("pusher:subscribe"));
        assert!(sent[0].contains("chatrooms.42.v2"));
        assert!(sent[1].contains("pusher:unsubscribe"));
        assert!(sent[2].contains("channel.7"));
    }

    #[tokio::test]
    async fn test_unwatch_channel_sends_subscribe_frame() {
        // Mirrors the live client; see the open questions in DESIGN.md.
        let mut socket = PusherSocket::new(MemoryTransport::default());
        socket.unwatch_channel(7).await.unwrap();

        let sent = socket.transport().sent();
        assert!(sent[0].contains("pusher:subscribe"));
        assert!(sent[0].contains("channel.7"));
    }

    #[tokio::test]
    async fn test_poll_event_routes_frame() {
        let transport = MemoryTransport::new([wire(
            "App\\Events\\ChatMessageEvent",
            "chatrooms.42.v2",
            serde_json::json!({
                "id": "msg-1",
                "chatroom_id": 42,
                "content": "hi",
                "created_at": "2023-02-03T23:09:34.000000Z",
                "sender": {"id": 9, "username": "viewer"}
            }),
        )]);

        let mut socket = PusherSocket::new(transport);
        let messages = Arc::new(Mutex::new(Vec::new()));
        {
            let messages = Arc::clone(&messages);
            socket.on("message", move |event| {
                if let DomainEvent::Message(msg) = event {
                    messages.lock().unwrap().push(msg.content.clone());
                }
            });
        }

        assert!(socket.poll_event().await.unwrap());
        assert!(!socket.poll_event().await.unwrap());
        assert_eq!(*messages.lock().unwrap(), vec!["hi"]);
    }

    #[tokio::test]
    async fn test_run_terminates_on_close() {
        let mut socket = PusherSocket::new(MemoryTransport::default());
        socket.close().await.unwrap();
        socket.run().await.unwrap();
        assert!(socket.is_closed());
    }

    #[tokio::test]
    async fn test_run_processes_whole_queue_in_order() {
        let frames = [
            wire(
                "App\\Events\\FollowersUpdated",
                "channel.7",
                serde_json::json!({"channel_id": 7, "followed": true}),
            ),
            wire(
                "App\\Events\\FollowersUpdated",
                "channel.7",
                serde_json::json!({"channel_id": 7, "followed": true}),
            ),
            wire(
                "App\\Events\\FollowersUpdated",
                "channel.7",
                serde_json::json!({"channel_id": 7, "followed": false}),
            ),
        ];

        let mut cache = EntityCache::new();
        cache.watch_user(CachedUser {
            id: 7,
            username: "streamer".into(),
            followers_count: 10,
        });

        let mut socket = PusherSocket::with_cache(MemoryTransport::new(frames), cache);
        let counts = Arc::new(Mutex::new(Vec::new()));
        for name in ["follow", "unfollow"] {
            let counts = Arc::clone(&counts);
            socket.on(name, move |event| {
                if let DomainEvent::Follow(u) | DomainEvent::Unfollow(u) = event {
                    counts.lock().unwrap().push(u.followers_count);
                }
            });
        }

        socket.run().await.unwrap();

        // Dispatch order equals wire-receive order
        assert_eq!(*counts.lock().unwrap(), vec![11, 12, 11]);
        assert_eq!(socket.cache().user(7).unwrap().followers_count, 11);
    }

    #[tokio::test]
    async fn test_malformed_frame_fails_poll() {
        let mut socket = PusherSocket::new(MemoryTransport::new(["{oops".to_string()]));
        assert!(socket.poll_event().await.is_err());
    }
}
