//! Per-connection subscription manager.
//!
//! Tracks which event topics a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::EventTopic;

/// Manages the set of topic subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    topics: HashSet<EventTopic>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds topics by name. `"*"` subscribes to every topic.
    ///
    /// Returns the names that were not recognized.
    pub fn subscribe<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let mut unknown = Vec::new();
        for name in names {
            match name.as_ref() {
                "*" => {
                    self.topics.insert(EventTopic::State);
                    self.topics.insert(EventTopic::Draw);
                }
                other => match EventTopic::parse(other) {
                    Some(topic) => {
                        self.topics.insert(topic);
                    }
                    None => unknown.push(other.to_string()),
                },
            }
        }
        unknown
    }

    /// Removes topics by name. `"*"` removes every topic.
    pub fn unsubscribe<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            match name.as_ref() {
                "*" => self.topics.clear(),
                other => {
                    if let Some(topic) = EventTopic::parse(other) {
                        self.topics.remove(&topic);
                    }
                }
            }
        }
    }

    /// Returns `true` if events of `topic` should be forwarded.
    #[must_use]
    pub fn matches(&self, topic: EventTopic) -> bool {
        self.topics.contains(&topic)
    }

    /// Subscribed topic names, sorted.
    #[must_use]
    pub fn topic_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .topics
            .iter()
            .map(|topic| match topic {
                EventTopic::State => "state",
                EventTopic::Draw => "draw",
            })
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(EventTopic::State));
        assert!(!mgr.matches(EventTopic::Draw));
    }

    #[test]
    fn subscribe_specific_topic() {
        let mut mgr = SubscriptionManager::new();
        let unknown = mgr.subscribe(&["draw", "roster"]);
        assert_eq!(unknown, ["roster"]);
        assert!(mgr.matches(EventTopic::Draw));
        assert!(!mgr.matches(EventTopic::State));
    }

    #[test]
    fn wildcard_matches_everything_until_cleared() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&["*"]);
        assert_eq!(mgr.topic_names(), ["draw", "state"]);
        mgr.unsubscribe(&["state"]);
        assert_eq!(mgr.topic_names(), ["draw"]);
        mgr.unsubscribe(&["*"]);
        assert!(mgr.topic_names().is_empty());
    }
}
