// ── Reconciliation engine ──
//
// Converges the persisted device model towards the facts published on the
// dispatcher. Every handler reads current persisted state first and writes
// only the delta, so replaying an event is harmless.

mod control;
mod device;
mod property;
mod state;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::CoreError;
use crate::event::{ConnectorEvent, EventDispatcher, EventKind, Listener, ListenerHandle};
use crate::model::{ConnectorId, STATE_PROPERTY_IDENTIFIER};
use crate::repository::{ChannelRepositories, DeviceRepositories};

/// Every event kind the engine subscribes to on `open()`.
pub const HANDLED_EVENTS: [EventKind; 11] = [
    EventKind::DeviceObserved,
    EventKind::DeviceFirmwareReported,
    EventKind::DeviceStateChanged,
    EventKind::ChannelObserved,
    EventKind::ChannelRemoved,
    EventKind::DevicePropertyObserved,
    EventKind::DevicePropertyRemoved,
    EventKind::ChannelPropertyObserved,
    EventKind::ChannelPropertyRemoved,
    EventKind::DevicePropertyValueReported,
    EventKind::ChannelPropertyValueReported,
];

/// Device property identifiers owned by the engine. Property events cannot
/// create, redescribe or remove them.
const RESERVED_DEVICE_PROPERTIES: [&str; 1] = [STATE_PROPERTY_IDENTIFIER];

/// The event handlers of one connector, built from the repository
/// families they write through.
pub struct Reconciler {
    connector: ConnectorId,
    devices: DeviceRepositories,
    channels: ChannelRepositories,
    registrations: Mutex<Vec<ListenerHandle>>,
}

impl Reconciler {
    pub fn new(
        connector: ConnectorId,
        devices: DeviceRepositories,
        channels: ChannelRepositories,
    ) -> Self {
        Self {
            connector,
            devices,
            channels,
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Register the engine for every handled event kind. A second call
    /// while open does nothing.
    pub fn open(self: &Arc<Self>, dispatcher: &EventDispatcher) {
        let mut registrations = self.registrations.lock();
        if !registrations.is_empty() {
            return;
        }

        for kind in HANDLED_EVENTS {
            let listener: Arc<dyn Listener> = Arc::clone(self) as Arc<dyn Listener>;
            registrations.push(dispatcher.add_listener(kind, listener));
        }
        debug!(connector = %self.connector, "reconciler opened");
    }

    /// Unregister exactly the registrations made by `open()`.
    pub fn close(&self, dispatcher: &EventDispatcher) {
        let mut registrations = self.registrations.lock();
        if registrations.is_empty() {
            return;
        }

        for handle in registrations.drain(..) {
            dispatcher.remove_listener(handle);
        }
        debug!(connector = %self.connector, "reconciler closed");
    }

    pub fn is_open(&self) -> bool {
        !self.registrations.lock().is_empty()
    }

    pub fn connector(&self) -> ConnectorId {
        self.connector
    }
}

impl Listener for Reconciler {
    fn handle(&self, event: &ConnectorEvent) -> Result<(), CoreError> {
        match event {
            ConnectorEvent::DeviceObserved(record) => self.device_observed(record),
            ConnectorEvent::DeviceFirmwareReported(report) => self.firmware_reported(report),
            ConnectorEvent::DeviceStateChanged(change) => self.device_state_changed(change),
            ConnectorEvent::ChannelObserved(record) => self.channel_observed(record),
            ConnectorEvent::ChannelRemoved(id) => self.channel_removed(*id),
            ConnectorEvent::DevicePropertyObserved(record) => property::upsert_property(
                self.devices.properties.as_ref(),
                record,
                &RESERVED_DEVICE_PROPERTIES,
            ),
            ConnectorEvent::DevicePropertyRemoved(id) => property::remove_property(
                self.devices.properties.as_ref(),
                *id,
                &RESERVED_DEVICE_PROPERTIES,
            ),
            ConnectorEvent::ChannelPropertyObserved(record) => {
                property::upsert_property(self.channels.properties.as_ref(), record, &[])
            }
            ConnectorEvent::ChannelPropertyRemoved(id) => {
                property::remove_property(self.channels.properties.as_ref(), *id, &[])
            }
            ConnectorEvent::DevicePropertyValueReported(report) => state::write_value(
                self.devices.properties.as_ref(),
                self.devices.states.as_ref(),
                report,
            ),
            ConnectorEvent::ChannelPropertyValueReported(report) => state::write_value(
                self.channels.properties.as_ref(),
                self.channels.states.as_ref(),
                report,
            ),
        }
    }
}
