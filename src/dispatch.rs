//! Publish/subscribe fan-out keyed by event name
//!
//! Delivery is synchronous within the publishing call and preserves
//! subscription order. Subscriber-side concurrency (spawning tasks,
//! channels) is the subscriber's concern, not the dispatcher's.

use crate::event::DomainEvent;
use std::collections::HashMap;

/// Boxed subscriber callback
pub type Subscriber = Box<dyn FnMut(&DomainEvent) + Send>;

/// Name-keyed dispatcher delivering events to subscribers in order
#[derive(Default)]
pub struct Dispatcher {
    subscribers: HashMap<String, Vec<Subscriber>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for a named event
    ///
    /// Subscribers for the same name are invoked in registration order.
    pub fn subscribe(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(&DomainEvent) + Send + 'static,
    ) {
        self.subscribers
            .entry(name.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Deliver an event to every current subscriber of its name
    pub fn publish(&mut self, event: &DomainEvent) {
        let name = event.name();
        if let Some(handlers) = self.subscribers.get_mut(name) {
            tracing::trace!(event = name, subscribers = handlers.len(), "Dispatching");
            for handler in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    /// Number of subscribers registered for a name
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.subscribers.get(name).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self
            .subscribers
            .iter()
            .map(|(name, handlers)| (name.as_str(), handlers.len()))
            .collect();
        names.sort();
        f.debug_struct("Dispatcher").field("subscribers", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn follow_event(id: i64) -> DomainEvent {
        DomainEvent::Follow(crate::cache::CachedUser {
            id,
            username: format!("user-{id}"),
            followers_count: 0,
        })
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let mut dispatcher = Dispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            dispatcher.subscribe("follow", move |_| seen.lock().unwrap().push(label));
        }

        dispatcher.publish(&follow_event(1));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_only_matching_name_receives() {
        let mut dispatcher = Dispatcher::new();
        let follows = Arc::new(Mutex::new(0));
        let unfollows = Arc::new(Mutex::new(0));

        {
            let follows = Arc::clone(&follows);
            dispatcher.subscribe("follow", move |_| *follows.lock().unwrap() += 1);
        }
        {
            let unfollows = Arc::clone(&unfollows);
            dispatcher.subscribe("unfollow", move |_| *unfollows.lock().unwrap() += 1);
        }

        dispatcher.publish(&follow_event(1));
        dispatcher.publish(&follow_event(2));

        assert_eq!(*follows.lock().unwrap(), 2);
        assert_eq!(*unfollows.lock().unwrap(), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.publish(&follow_event(1));
        assert_eq!(dispatcher.subscriber_count("follow"), 0);
    }

    #[test]
    fn test_subscriber_receives_event_payload() {
        let mut dispatcher = Dispatcher::new();
        let captured = Arc::new(Mutex::new(None));

        {
            let captured = Arc::clone(&captured);
            dispatcher.subscribe("follow", move |event| {
                if let DomainEvent::Follow(user) = event {
                    *captured.lock().unwrap() = Some(user.clone());
                }
            });
        }

        dispatcher.publish(&follow_event(9));
        assert_eq!(captured.lock().unwrap().as_ref().unwrap().id, 9);
    }

    #[test]
    fn test_subscriber_count() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe("message", |_| {});
        dispatcher.subscribe("message", |_| {});
        assert_eq!(dispatcher.subscriber_count("message"), 2);
        assert_eq!(dispatcher.subscriber_count("ban"), 0);
    }
}
