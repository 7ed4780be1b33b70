// ── Domain model ──
//
// Persisted entities (devices, channels, properties, controls, property
// state) and the observed records the field protocol reports about them.

pub mod common;
pub mod entity_id;

pub mod channel;
pub mod device;
pub mod property;
pub mod record;
pub mod state;
pub mod value;

// ── Re-exports ──────────────────────────────────────────────────────

pub use entity_id::{ChannelId, ConnectorId, ControlId, DeviceId, ParentId, PropertyId};

pub use common::{ConnectionState, DataType, STATE_PROPERTY_IDENTIFIER, ValueFormat};
pub use value::{NOT_AVAILABLE, PropertyValue};

pub use channel::Channel;
pub use device::{Device, FirmwareInfo, HardwareInfo};
pub use property::{
    ChannelControl, ChannelProperty, Control, DeviceControl, DeviceProperty, Property,
    PropertyDescriptor,
};
pub use state::PropertyState;

pub use record::{
    ChannelRecord, DeviceRecord, FirmwareReport, PropertyRecord, StateChange, ValueReport,
};
