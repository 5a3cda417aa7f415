//! Client-wide entity cache consulted and mutated by the router
//!
//! Lookup misses return `None`, never an error — handlers treat absence
//! as a no-op so a frame for an unwatched entity can't fail the loop.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A watched user with a live follower counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUser {
    pub id: i64,
    pub username: String,
    /// Mutated in place by `FollowersUpdated` routing
    pub followers_count: i64,
}

/// A registered chatroom and the streamer it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedChatroom {
    pub id: i64,
    /// Username of the owning streamer, resolved by the REST collaborator
    pub streamer: String,
}

/// Mapping from integer id to cached user and chatroom state
///
/// Owned by the client; passed to the router as an explicit context so
/// routing stays unit-testable without a live connection. Entries live
/// until explicitly evicted.
#[derive(Debug, Default)]
pub struct EntityCache {
    watched_users: HashMap<i64, CachedUser>,
    chatrooms: HashMap<i64, CachedChatroom>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching a user, replacing any previous entry for its id
    pub fn watch_user(&mut self, user: CachedUser) {
        self.watched_users.insert(user.id, user);
    }

    pub fn user(&self, id: i64) -> Option<&CachedUser> {
        self.watched_users.get(&id)
    }

    pub fn user_mut(&mut self, id: i64) -> Option<&mut CachedUser> {
        self.watched_users.get_mut(&id)
    }

    /// Stop watching a user, returning the evicted entry if present
    pub fn unwatch_user(&mut self, id: i64) -> Option<CachedUser> {
        self.watched_users.remove(&id)
    }

    /// Register a chatroom, replacing any previous entry for its id
    pub fn register_chatroom(&mut self, chatroom: CachedChatroom) {
        self.chatrooms.insert(chatroom.id, chatroom);
    }

    pub fn chatroom(&self, id: i64) -> Option<&CachedChatroom> {
        self.chatrooms.get(&id)
    }

    /// Drop a chatroom registration, returning the evicted entry if present
    pub fn unregister_chatroom(&mut self, id: i64) -> Option<CachedChatroom> {
        self.chatrooms.remove(&id)
    }

    pub fn watched_user_count(&self) -> usize {
        self.watched_users.len()
    }

    pub fn chatroom_count(&self) -> usize {
        self.chatrooms.len()
    }
}
