//! # kick-event
//!
//! Pusher-protocol ingestion and dispatch engine for Kick chat events.
//!
//! ## Overview
//!
//! `kick-event` receives frames from Kick's Pusher websocket, decodes the
//! double-encoded JSON envelope, classifies the payload by its event-type
//! tag, enriches it against locally cached entity state (watched users,
//! chatroom registry), and republishes it as a named domain event to
//! subscribers. REST lookups and the data-view layer live outside this
//! crate; they feed the cache, the engine never calls them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kick_event::{DomainEvent, PusherConfig, PusherSocket, WsTransport};
//!
//! # async fn example() -> kick_event::Result<()> {
//! let transport = WsTransport::connect(&PusherConfig::default()).await?;
//! let mut socket = PusherSocket::new(transport);
//!
//! socket.on("message", |event| {
//!     if let DomainEvent::Message(msg) = event {
//!         println!("[{}] {}", msg.sender.username, msg.content);
//!     }
//! });
//!
//! socket.subscribe_chatroom(123456).await?;
//! socket.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **FrameTransport** trait — the connection seam (`WsTransport`,
//!   `MemoryTransport`)
//! - **RawEnvelope** — double-encoded wire envelope and channel names
//! - **EventTag** + payload schemas — per-tag typed decoding
//! - **EntityCache** — watched users and the chatroom registry
//! - **router** — tag→handler table producing domain events
//! - **Dispatcher** — name-keyed synchronous fan-out to subscribers
//! - **PusherSocket** — the per-connection loop and subscription control

pub mod cache;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod event;
pub mod router;
pub mod schema;
pub mod socket;
pub mod transport;

// Re-export core types
pub use cache::{CachedChatroom, CachedUser, EntityCache};
pub use dispatch::Dispatcher;
pub use envelope::{ChannelName, RawEnvelope};
pub use error::{PusherError, Result};
pub use event::{DomainEvent, EVENT_NAMES};
pub use schema::EventTag;
pub use socket::{ControlFrame, PusherSocket};
pub use transport::{FrameTransport, MemoryTransport, PusherConfig, WsTransport};
