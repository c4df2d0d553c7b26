//! Pub/Sub: `publish(topic, msg)` delivers to every subscriber whose
//! filter is a prefix of `topic`.

use std::sync::{Arc, Mutex};

use crate::channel::Channel;
use crate::timeout::Timeout;

struct Subscription<T> {
    filter: String,
    channel: Arc<Channel<T>>,
}

pub struct PubSub<T> {
    subscribers: Mutex<Vec<Subscription<T>>>,
}

impl<T: Clone> PubSub<T> {
    pub fn new() -> Self {
        PubSub { subscribers: Mutex::new(Vec::new()) }
    }

    /// Register a new subscriber matching every topic starting with
    /// `filter` (the empty string matches everything). Returns the
    /// channel messages will be delivered on.
    pub fn subscribe(&self, filter: impl Into<String>, capacity: usize) -> Arc<Channel<T>> {
        let channel = Arc::new(Channel::new(capacity));
        self.subscribers
            .lock()
            .unwrap()
            .push(Subscription { filter: filter.into(), channel: channel.clone() });
        channel
    }

    /// Deliver `msg` to every subscriber whose filter prefix-matches
    /// `topic`. Returns how many subscribers actually received it —
    /// a slow or closed subscriber can be skipped without failing the
    /// whole publish.
    pub fn publish(&self, topic: &str, msg: T, timeout: Timeout) -> usize {
        let subscribers = self.subscribers.lock().unwrap();
        subscribers
            .iter()
            .filter(|sub| topic.starts_with(sub.filter.as_str()))
            .filter(|sub| sub.channel.send(msg.clone(), 0, timeout).is_ok())
            .count()
    }

    /// Closes every subscriber's channel, letting each drain whatever was
    /// already buffered before failing further receives.
    pub fn close(&self) {
        for sub in self.subscribers.lock().unwrap().iter() {
            sub.channel.close();
        }
    }
}

impl<T: Clone> Default for PubSub<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_only_matching_subscribers() {
        let hub: PubSub<String> = PubSub::new();
        let metrics = hub.subscribe("metrics.", 4);
        let logs = hub.subscribe("logs.", 4);

        let delivered = hub.publish("metrics.cpu", "98%".to_string(), Timeout::Blocking);
        assert_eq!(delivered, 1);
        assert_eq!(metrics.recv(Timeout::Blocking).unwrap(), "98%");
        assert_eq!(logs.recv(Timeout::NonBlocking).unwrap_err().to_string(), "would block");
    }

    #[test]
    fn empty_filter_matches_every_topic() {
        let hub: PubSub<i32> = PubSub::new();
        let all = hub.subscribe("", 4);
        hub.publish("anything.at.all", 1, Timeout::Blocking);
        assert_eq!(all.recv(Timeout::Blocking).unwrap(), 1);
    }

    #[test]
    fn close_propagates_to_every_subscriber() {
        let hub: PubSub<i32> = PubSub::new();
        let sub = hub.subscribe("", 4);
        hub.close();
        assert!(sub.is_closed());
    }
}
