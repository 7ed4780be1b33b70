// ── Connector events ──
//
// Facts published by the protocol client. Each variant carries exactly one
// record type and maps to a distinct `EventKind`, which is what listeners
// register against.

mod dispatcher;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants, EnumIter};

pub use dispatcher::{EventDispatcher, Listener, ListenerHandle};

use crate::model::{
    ChannelId, ChannelRecord, DeviceId, DeviceRecord, FirmwareReport, PropertyId, PropertyRecord,
    StateChange, ValueReport,
};

/// An externally observed fact about the device model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(tag = "event", content = "record", rename_all = "snake_case")]
#[strum_discriminants(name(EventKind), derive(Hash, Display, EnumIter))]
pub enum ConnectorEvent {
    /// A device announced itself, with its full control set and current
    /// connection state.
    DeviceObserved(DeviceRecord),
    /// Partial firmware facts for a known device.
    DeviceFirmwareReported(FirmwareReport),
    DeviceStateChanged(StateChange),

    ChannelObserved(ChannelRecord),
    ChannelRemoved(ChannelId),

    DevicePropertyObserved(PropertyRecord<DeviceId>),
    DevicePropertyRemoved(PropertyId),
    ChannelPropertyObserved(PropertyRecord<ChannelId>),
    ChannelPropertyRemoved(PropertyId),

    DevicePropertyValueReported(ValueReport),
    ChannelPropertyValueReported(ValueReport),
}

impl ConnectorEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }
}
