//! Tag-keyed routing from decoded frames to domain events
//!
//! `route` is the single entry point the receive loop calls per frame:
//! it fires the two unconditional pass-through events, then decodes the
//! tag-specific payload against its schema, consults or mutates the
//! entity cache, and publishes at most one domain event. Unknown tags
//! are ignored. Cache misses are absence, never failure.

use crate::cache::{CachedChatroom, EntityCache};
use crate::dispatch::Dispatcher;
use crate::envelope::{ChannelName, RawEnvelope};
use crate::error::{PusherError, Result};
use crate::event::{parse_timestamp, DomainEvent};
use crate::schema::{
    BannedPayload, ChatroomUpdatedPayload, EventTag, FollowersUpdatedPayload,
    LivestreamEnvelope, MessagePayload, PinnedMessageCreatedPayload, SubscriptionPayload,
    UnbannedPayload,
};
use chrono::Utc;
use serde::de::DeserializeOwned;

/// Route one decoded frame, publishing its domain events
///
/// Dispatch order equals wire-receive order: the caller invokes this once
/// per frame from a single consumer loop, and everything here runs
/// synchronously before the next receive.
pub fn route(
    envelope: &RawEnvelope,
    payload: &serde_json::Value,
    cache: &mut EntityCache,
    dispatcher: &mut Dispatcher,
) -> Result<()> {
    dispatcher.publish(&DomainEvent::PayloadReceive {
        tag: envelope.event.clone(),
        payload: payload.clone(),
    });
    dispatcher.publish(&DomainEvent::RawPayloadReceive(envelope.clone()));

    let Some(tag) = EventTag::parse(&envelope.event) else {
        tracing::trace!(tag = %envelope.event, "Ignoring unrecognized event tag");
        return Ok(());
    };

    tracing::debug!(tag = ?tag, channel = %envelope.channel, "Routing frame");

    match tag {
        EventTag::ChatMessage => {
            let message: MessagePayload = decode(&envelope.event, payload)?;
            dispatcher.publish(&DomainEvent::Message(message));
        }

        EventTag::StreamerIsLive => {
            let wrapped: LivestreamEnvelope = decode(&envelope.event, payload)?;
            dispatcher.publish(&DomainEvent::LivestreamStart(wrapped.livestream));
        }

        EventTag::StopStreamBroadcast => {
            let wrapped: LivestreamEnvelope = decode(&envelope.event, payload)?;
            dispatcher.publish(&DomainEvent::LivestreamEnd(wrapped.livestream));
        }

        EventTag::FollowersUpdated => {
            let update: FollowersUpdatedPayload = decode(&envelope.event, payload)?;

            // Counter mutation and dispatch are indivisible: both happen
            // here, synchronously, before the next frame is received.
            let Some(user) = cache.user_mut(update.channel_id) else {
                tracing::debug!(
                    channel_id = update.channel_id,
                    "FollowersUpdated for unwatched user"
                );
                return Ok(());
            };

            let event = if update.followed {
                user.followers_count += 1;
                DomainEvent::Follow(user.clone())
            } else {
                user.followers_count -= 1;
                DomainEvent::Unfollow(user.clone())
            };
            dispatcher.publish(&event);
        }

        EventTag::UserBanned => {
            let ban: BannedPayload = decode(&envelope.event, payload)?;
            let chatroom = resolve_chatroom(&envelope.channel, cache)?;

            let event = if ban.permanent {
                DomainEvent::Ban {
                    user: ban.user,
                    chatroom,
                    banned_by: ban.banned_by.username,
                }
            } else {
                let raw = ban.expires_at.as_deref().ok_or_else(|| PusherError::Payload {
                    tag: envelope.event.clone(),
                    reason: "temporary ban without expires_at".to_string(),
                })?;
                DomainEvent::Timeout {
                    user: ban.user,
                    chatroom,
                    banned_by: ban.banned_by.username,
                    expires_at: parse_timestamp(raw)?,
                }
            };
            dispatcher.publish(&event);
        }

        EventTag::UserUnbanned => {
            let unban: UnbannedPayload = decode(&envelope.event, payload)?;
            let chatroom = resolve_chatroom(&envelope.channel, cache)?;

            let event = if unban.permanent {
                DomainEvent::Unban {
                    user: unban.user,
                    chatroom,
                    unbanned_by: unban.unbanned_by.username,
                }
            } else {
                DomainEvent::Untimeout {
                    user: unban.user,
                    chatroom,
                    unbanned_by: unban.unbanned_by.username,
                }
            };
            dispatcher.publish(&event);
        }

        EventTag::ChatroomClear => {
            let chatroom = resolve_chatroom(&envelope.channel, cache)?;
            dispatcher.publish(&DomainEvent::ChatroomClear {
                chatroom,
                cleared_at: Utc::now(),
            });
        }

        EventTag::Subscription => {
            let sub: SubscriptionPayload = decode(&envelope.event, payload)?;
            let chatroom = cache.chatroom(sub.chatroom_id).cloned();
            dispatcher.publish(&DomainEvent::Subscription {
                username: sub.username,
                months: sub.months,
                chatroom,
            });
        }

        EventTag::PinnedMessageCreated => {
            let pin: PinnedMessageCreatedPayload = decode(&envelope.event, payload)?;
            let chatroom = cache.chatroom(pin.message.chatroom_id).cloned();
            dispatcher.publish(&DomainEvent::PinnedMessageCreate {
                chatroom,
                content: pin.message.content,
                created_at: parse_timestamp(&pin.message.created_at)?,
                sender: pin.message.sender.username,
                duration: pin.duration,
                kind: pin.message.kind,
            });
        }

        EventTag::PinnedMessageDeleted => {
            let chatroom = resolve_chatroom(&envelope.channel, cache)?;
            dispatcher.publish(&DomainEvent::PinnedMessageClear { chatroom });
        }

        EventTag::ChatroomUpdated => {
            let update: ChatroomUpdatedPayload = decode(&envelope.event, payload)?;
            dispatcher.publish(&DomainEvent::ChatroomUpdate {
                slow_mode: update.slow_mode,
                subscribers_mode: update.subscribers_mode.enabled,
                followers_mode: update.followers_mode,
                emotes_mode: update.emotes_mode.enabled,
                advanced_bot_protection: update.advanced_bot_protection.enabled,
            });
        }

        EventTag::SubscriptionSucceeded => {
            let event = match ChannelName::parse(&envelope.channel)? {
                ChannelName::Chatroom(id) => DomainEvent::ChatroomSubscribe {
                    chatroom: cache.chatroom(id).cloned(),
                },
                ChannelName::Channel(id) => DomainEvent::ChannelSubscribe {
                    user: cache.user(id).cloned(),
                },
            };
            dispatcher.publish(&event);
        }

        EventTag::ConnectionEstablished => {
            dispatcher.publish(&DomainEvent::ConnectionEstablish(payload.clone()));
        }
    }

    Ok(())
}

/// Decode a tag-specific payload against its schema
fn decode<T: DeserializeOwned>(tag: &str, payload: &serde_json::Value) -> Result<T> {
    serde_json::from_value(payload.clone()).map_err(|e| PusherError::Payload {
        tag: tag.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve the chatroom a frame belongs to from its channel name
///
/// A malformed channel name is a protocol contract violation and
/// propagates; a registry miss is plain absence.
fn resolve_chatroom(channel: &str, cache: &EntityCache) -> Result<Option<CachedChatroom>> {
    let name = ChannelName::parse(channel)?;
    Ok(cache.chatroom(name.id()).cloned())
}
