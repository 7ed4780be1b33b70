// ── Connector facade ──
//
// Wires one connector run together: the reference store, the state store,
// the dispatcher, the reconciliation engine and the pending subscription
// registry.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ConnectorConfig;
use crate::error::CoreError;
use crate::event::{ConnectorEvent, EventDispatcher};
use crate::reconcile::Reconciler;
use crate::repository::StateRepository;
use crate::store::{DataStore, StateStore};
use crate::subscription::SubscriptionRegistry;

/// The main entry point for the protocol client.
///
/// Publishing is synchronous: `publish()` returns once every handler has
/// run. The subscription registry is owned here and mutated through
/// `&mut self`.
pub struct Connector {
    config: ConnectorConfig,
    store: Arc<DataStore>,
    states: Arc<StateStore>,
    dispatcher: Arc<EventDispatcher>,
    reconciler: Arc<Reconciler>,
    subscriptions: SubscriptionRegistry,
}

impl Connector {
    /// Create a connector from configuration. Does NOT register the
    /// handlers; call [`open()`](Self::open) for that.
    pub fn new(config: ConnectorConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let states = Arc::new(if config.state_storage {
            StateStore::new()
        } else {
            StateStore::disabled()
        });
        let state_repo: Arc<dyn StateRepository> = Arc::clone(&states) as Arc<dyn StateRepository>;

        let reconciler = Arc::new(Reconciler::new(
            config.connector_id,
            store.device_repositories(Arc::clone(&state_repo)),
            store.channel_repositories(state_repo),
        ));

        Self {
            config,
            store,
            states,
            dispatcher: Arc::new(EventDispatcher::new()),
            reconciler,
            subscriptions: SubscriptionRegistry::new(),
        }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    pub fn states(&self) -> &Arc<StateStore> {
        &self.states
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Register every handler on the dispatcher. Idempotent.
    pub fn open(&self) {
        if self.reconciler.is_open() {
            return;
        }
        self.reconciler.open(&self.dispatcher);
        info!(
            connector = %self.config.identifier,
            state_storage = self.states.is_enabled(),
            "connector opened"
        );
    }

    /// Unregister exactly the handlers `open()` registered. Idempotent.
    pub fn close(&self) {
        if !self.reconciler.is_open() {
            return;
        }
        self.reconciler.close(&self.dispatcher);
        info!(connector = %self.config.identifier, "connector closed");
    }

    pub fn is_open(&self) -> bool {
        self.reconciler.is_open()
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Publish an observed fact. Returns the first handler error.
    pub fn publish(&self, event: &ConnectorEvent) -> Result<(), CoreError> {
        let kind = event.kind();
        if self.dispatcher.listener_count(kind) == 0 {
            debug!(%kind, "no listener registered, event not handled");
        }
        self.dispatcher.fire(event)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    pub fn subscriptions_mut(&mut self) -> &mut SubscriptionRegistry {
        &mut self.subscriptions
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::reconcile::HANDLED_EVENTS;

    #[test]
    fn open_and_close_are_symmetric_and_idempotent() {
        let connector = Connector::new(ConnectorConfig::default());
        assert!(connector.dispatcher().is_empty());

        connector.open();
        connector.open();
        assert!(connector.is_open());
        assert_eq!(connector.dispatcher().len(), HANDLED_EVENTS.len());
        assert_eq!(connector.dispatcher().listener_count(EventKind::DeviceObserved), 1);

        connector.close();
        connector.close();
        assert!(!connector.is_open());
        assert!(connector.dispatcher().is_empty());

        connector.open();
        assert_eq!(connector.dispatcher().len(), HANDLED_EVENTS.len());
    }

    #[test]
    fn closed_connector_still_feeds_other_listeners() {
        let connector = Connector::new(ConnectorConfig::default());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        connector.dispatcher().add_listener(
            EventKind::ChannelRemoved,
            Arc::new(move |event: &ConnectorEvent| {
                sink.lock().push(event.kind());
                Ok(())
            }),
        );

        connector
            .publish(&ConnectorEvent::ChannelRemoved(crate::model::ChannelId::new()))
            .unwrap();

        assert!(!connector.is_open());
        assert_eq!(*seen.lock(), vec![EventKind::ChannelRemoved]);
    }

    #[test]
    fn state_storage_follows_config() {
        let disabled = Connector::new(ConnectorConfig {
            state_storage: false,
            ..ConnectorConfig::default()
        });
        assert!(!disabled.states().is_enabled());
        assert!(Connector::new(ConnectorConfig::default()).states().is_enabled());
    }
}
