//! Subscriber set and non-blocking fan-out

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arbiter_core::EngineEvent;
use arbiter_ports::EventPublisher;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::Result;

pub type SubscriberId = u64;

/// Configuration for the hub and its sessions
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Outbound frames buffered per subscriber
    pub buffer_capacity: usize,
    /// Period of the keepalive ping
    pub keepalive_interval: Duration,
    /// Silence after which a subscriber is disconnected
    pub keepalive_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 256,
            keepalive_interval: Duration::from_secs(54),
            keepalive_timeout: Duration::from_secs(60),
        }
    }
}

struct Subscriber {
    tx: mpsc::Sender<Arc<str>>,
    /// Event types wanted; empty means all
    topics: HashSet<String>,
}

impl Subscriber {
    fn wants(&self, event_type: &str) -> bool {
        self.topics.is_empty() || self.topics.contains(event_type)
    }

    /// False when the subscriber must be dropped
    fn offer(&self, id: SubscriberId, frame: &Arc<str>) -> bool {
        match self.tx.try_send(frame.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("[hub] subscriber {} is not keeping up, disconnecting", id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("[hub] subscriber {} already gone", id);
                false
            }
        }
    }
}

/// Owns the connected subscribers
///
/// Cheap to clone; clones share state. Publishing never waits on a
/// subscriber.
#[derive(Clone)]
pub struct BroadcastHub {
    subscribers: Arc<DashMap<SubscriberId, Subscriber>>,
    next_id: Arc<AtomicU64>,
    config: Arc<HubConfig>,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl BroadcastHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            subscribers: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Add a subscriber; frames for it arrive on the returned receiver
    pub fn register(&self) -> (SubscriberId, mpsc::Receiver<Arc<str>>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.config.buffer_capacity.max(1));
        self.subscribers.insert(
            id,
            Subscriber {
                tx,
                topics: HashSet::new(),
            },
        );
        info!("[hub] subscriber {} connected ({} total)", id, self.subscribers.len());
        (id, rx)
    }

    /// Drop a subscriber; its receiver sees the end of the stream
    pub fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            info!("[hub] subscriber {} disconnected", id);
        }
        removed
    }

    pub fn subscribe(&self, id: SubscriberId, topics: Vec<String>) {
        if let Some(mut sub) = self.subscribers.get_mut(&id) {
            debug!("[hub] subscriber {} subscribed to {:?}", id, topics);
            sub.topics.extend(topics);
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId, topics: &[String]) {
        if let Some(mut sub) = self.subscribers.get_mut(&id) {
            debug!("[hub] subscriber {} unsubscribed from {:?}", id, topics);
            for topic in topics {
                sub.topics.remove(topic);
            }
        }
    }

    pub fn topics(&self, id: SubscriberId) -> Option<HashSet<String>> {
        self.subscribers.get(&id).map(|s| s.topics.clone())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Serialize once and offer to every interested subscriber
    ///
    /// Returns how many subscribers accepted the frame.
    pub fn broadcast(&self, event: &EngineEvent) -> Result<usize> {
        let frame: Arc<str> = serde_json::to_string(event)?.into();
        let event_type = event.event_type();

        let mut delivered = 0;
        self.subscribers.retain(|id, sub| {
            if !sub.wants(event_type) {
                return true;
            }
            let kept = sub.offer(*id, &frame);
            if kept {
                delivered += 1;
            }
            kept
        });
        Ok(delivered)
    }

    /// Send one event to one subscriber, bypassing its topic filter
    pub fn send_to(&self, id: SubscriberId, event: &EngineEvent) -> Result<bool> {
        let frame: Arc<str> = serde_json::to_string(event)?.into();
        let kept = match self.subscribers.get(&id) {
            Some(sub) => sub.offer(id, &frame),
            None => return Ok(false),
        };
        if !kept {
            self.remove(id);
        }
        Ok(kept)
    }
}

impl EventPublisher for BroadcastHub {
    fn publish(&self, event: EngineEvent) {
        if let Err(e) = self.broadcast(&event) {
            error!("[hub] dropping {} event: {}", event.event_type(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::{Notification, PriceUpdate};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn price_event() -> EngineEvent {
        EngineEvent::PriceUpdate(PriceUpdate {
            item: "AK-47 | Redline".into(),
            price: dec!(100),
            venue: "buff".into(),
            time: Utc::now(),
        })
    }

    #[test]
    fn test_envelope_delivered_to_all() {
        let hub = BroadcastHub::default();
        let (_, mut a) = hub.register();
        let (_, mut b) = hub.register();

        assert_eq!(hub.broadcast(&price_event()).unwrap(), 2);

        let frame = a.try_recv().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "price_update");
        assert_eq!(value["data"]["venue"], "buff");
        assert_eq!(b.try_recv().unwrap(), frame);
    }

    #[test]
    fn test_topic_filter() {
        let hub = BroadcastHub::default();
        let (id, mut rx) = hub.register();
        hub.subscribe(id, vec!["notification".into()]);

        assert_eq!(hub.broadcast(&price_event()).unwrap(), 0);
        assert!(rx.try_recv().is_err());

        hub.broadcast(&EngineEvent::Notification(Notification::info("hi", "there")))
            .unwrap();
        assert!(rx.try_recv().is_ok());

        hub.unsubscribe(id, &["notification".to_string()]);
        assert!(hub.topics(id).unwrap().is_empty());
        assert_eq!(hub.broadcast(&price_event()).unwrap(), 1);
    }

    #[test]
    fn test_full_buffer_disconnects_only_that_subscriber() {
        let hub = BroadcastHub::new(HubConfig {
            buffer_capacity: 2,
            ..Default::default()
        });
        let (_, _slow) = hub.register();
        let (_, mut fast) = hub.register();

        for _ in 0..2 {
            hub.broadcast(&price_event()).unwrap();
            fast.try_recv().unwrap();
        }
        // slow buffer is full now
        assert_eq!(hub.broadcast(&price_event()).unwrap(), 1);
        assert_eq!(hub.subscriber_count(), 1);
        assert!(fast.try_recv().is_ok());
    }

    #[test]
    fn test_closed_receiver_is_dropped() {
        let hub = BroadcastHub::default();
        let (id, rx) = hub.register();
        drop(rx);

        hub.publish(price_event());
        assert_eq!(hub.subscriber_count(), 0);
        assert!(!hub.send_to(id, &EngineEvent::Pong(1)).unwrap());
    }
}
