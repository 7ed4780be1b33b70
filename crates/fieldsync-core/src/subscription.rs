// ── Subscription correlation ──
//
// Pending protocol subscriptions keyed by the packet id the broker echoes
// back in its acknowledgment. Packet ids are only unique among in-flight
// requests, so a new request may reuse (and overwrite) an old id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;

/// MQTT delivery guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl TryFrom<u8> for QoS {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactlyOnce),
            other => Err(CoreError::ValidationFailed {
                message: format!("QoS must be 0, 1 or 2, got {other}"),
            }),
        }
    }
}

impl From<QoS> for u8 {
    fn from(qos: QoS) -> Self {
        match qos {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

/// One in-flight subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub topic: String,
    pub qos: QoS,
    /// Packet id of the SUBSCRIBE request.
    pub mid: u16,
}

/// Pending subscriptions, in the order they were requested.
///
/// Mutation takes `&mut self`; the owning connector serialises access.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    items: IndexMap<u16, Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pending subscription, replacing any entry with the same
    /// packet id.
    pub fn create(&mut self, topic: impl Into<String>, qos: QoS, mid: u16) -> Subscription {
        let subscription = Subscription {
            topic: topic.into(),
            qos,
            mid,
        };

        if let Some(previous) = self.items.insert(mid, subscription.clone()) {
            warn!(mid, topic = %previous.topic, "pending subscription overwritten");
        }
        debug!(mid, topic = %subscription.topic, "subscription pending");
        subscription
    }

    pub fn get_by_id(&self, mid: u16) -> Option<&Subscription> {
        self.items.get(&mid)
    }

    /// Forget a subscription once acknowledged. Fails if nothing is
    /// pending under its packet id.
    pub fn delete(&mut self, subscription: &Subscription) -> Result<(), CoreError> {
        let Some(removed) = self.items.shift_remove(&subscription.mid) else {
            return Err(CoreError::SubscriptionNotFound {
                mid: subscription.mid,
            });
        };
        debug!(mid = removed.mid, topic = %removed.topic, "subscription settled");
        Ok(())
    }

    /// Fresh iterator over pending subscriptions, in insertion order.
    pub fn iter(&self) -> indexmap::map::Values<'_, u16, Subscription> {
        self.items.values()
    }

    /// Owned copy of every pending subscription.
    pub fn snapshot(&self) -> Vec<Subscription> {
        self.items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a SubscriptionRegistry {
    type Item = &'a Subscription;
    type IntoIter = indexmap::map::Values<'a, u16, Subscription>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn create_get_delete_round_trip() {
        let mut registry = SubscriptionRegistry::new();
        let created = registry.create("home/device/1/value", QoS::AtLeastOnce, 42);

        assert_eq!(registry.get_by_id(42), Some(&created));
        registry.delete(&created).unwrap();
        assert_eq!(registry.get_by_id(42), None);

        let err = registry.delete(&created).unwrap_err();
        assert!(matches!(err, CoreError::SubscriptionNotFound { mid: 42 }));

        registry.create("home/device/1/value", QoS::AtLeastOnce, 42);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn create_overwrites_same_mid() {
        let mut registry = SubscriptionRegistry::new();
        registry.create("a", QoS::AtMostOnce, 7);
        registry.create("b", QoS::ExactlyOnce, 7);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_by_id(7).unwrap().topic, "b");
    }

    #[test]
    fn iteration_is_restartable_and_ordered() {
        let mut registry = SubscriptionRegistry::new();
        for (mid, topic) in [(3, "c"), (1, "a"), (2, "b")] {
            registry.create(topic, QoS::AtMostOnce, mid);
        }

        let first: Vec<u16> = registry.iter().map(|s| s.mid).collect();
        let second: Vec<u16> = (&registry).into_iter().map(|s| s.mid).collect();
        assert_eq!(first, vec![3, 1, 2]);
        assert_eq!(first, second);

        // A partial walk leaves nothing behind for the next one.
        assert_eq!(registry.iter().next().unwrap().mid, 3);
        assert_eq!(registry.iter().count(), 3);
    }

    #[test]
    fn delete_keeps_remaining_order() {
        let mut registry = SubscriptionRegistry::new();
        let a = registry.create("a", QoS::AtMostOnce, 1);
        registry.create("b", QoS::AtMostOnce, 2);
        registry.create("c", QoS::AtMostOnce, 3);

        registry.delete(&a).unwrap();
        let topics: Vec<String> = registry.snapshot().into_iter().map(|s| s.topic).collect();
        assert_eq!(topics, vec!["b", "c"]);
    }

    #[test]
    fn qos_validation() {
        assert_eq!(QoS::try_from(1).unwrap(), QoS::AtLeastOnce);
        assert!(matches!(
            QoS::try_from(3),
            Err(CoreError::ValidationFailed { .. })
        ));
        assert_eq!(u8::from(QoS::ExactlyOnce), 2);

        let json = serde_json::to_string(&QoS::AtLeastOnce).unwrap();
        assert_eq!(json, "1");
        assert!(serde_json::from_str::<QoS>("5").is_err());
    }
}
