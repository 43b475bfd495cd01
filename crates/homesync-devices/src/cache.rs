//! Bounded per-topic message cache.
//!
//! Answers "most recent value" queries without touching persistent
//! storage. Each topic keeps a fixed-capacity ring: the oldest entry is
//! evicted on overflow.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use tokio::sync::RwLock;

/// Default number of payloads retained per topic.
pub const DEFAULT_TOPIC_CAPACITY: usize = 100;

/// Bounded cache of decoded payloads keyed by topic.
pub struct TopicCache {
    capacity: usize,
    topics: RwLock<HashMap<String, VecDeque<Value>>>,
}

impl TopicCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Append a payload, evicting the oldest entry if the topic is full.
    pub async fn push(&self, topic: &str, payload: Value) {
        let mut topics = self.topics.write().await;
        let ring = topics.entry(topic.to_string()).or_default();
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        ring.push_back(payload);
    }

    /// The newest payload on a topic, if any.
    pub async fn latest(&self, topic: &str) -> Option<Value> {
        let topics = self.topics.read().await;
        topics.get(topic).and_then(|ring| ring.back().cloned())
    }

    /// Every cached payload on a topic, oldest first.
    pub async fn messages(&self, topic: &str) -> Vec<Value> {
        let topics = self.topics.read().await;
        topics
            .get(topic)
            .map(|ring| ring.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of payloads cached for a topic.
    pub async fn len(&self, topic: &str) -> usize {
        let topics = self.topics.read().await;
        topics.get(topic).map(|ring| ring.len()).unwrap_or(0)
    }
}

impl Default for TopicCache {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_latest() {
        let cache = TopicCache::default();
        assert!(cache.latest("device/fps").await.is_none());

        cache.push("device/fps", json!({"fps": 30.0})).await;
        cache.push("device/fps", json!({"fps": 42.0})).await;

        let latest = cache.latest("device/fps").await.unwrap();
        assert_eq!(latest["fps"], 42.0);
    }

    #[tokio::test]
    async fn test_eviction_keeps_newest() {
        let cache = TopicCache::new(3);
        for i in 0..10 {
            cache.push("t", json!({"seq": i})).await;
        }

        assert_eq!(cache.len("t").await, 3);
        let messages = cache.messages("t").await;
        assert_eq!(messages[0]["seq"], 7);
        assert_eq!(messages[2]["seq"], 9);
    }

    #[tokio::test]
    async fn test_topics_independent() {
        let cache = TopicCache::new(2);
        cache.push("a", json!(1)).await;
        cache.push("b", json!(2)).await;

        assert_eq!(cache.len("a").await, 1);
        assert_eq!(cache.len("b").await, 1);
        assert!(cache.messages("c").await.is_empty());
    }
}
