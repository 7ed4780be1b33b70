// ── Property and control domain types ──
//
// Device and channel properties (and controls) are structurally identical;
// they differ only in the id type of their parent.

use serde::{Deserialize, Serialize};

use super::common::{DataType, ValueFormat};
use super::entity_id::{ChannelId, ControlId, DeviceId, PropertyId};
use super::value::PropertyValue;

/// Descriptive fields of a property, as observed on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub identifier: String,
    pub name: Option<String>,
    pub data_type: DataType,
    pub format: Option<ValueFormat>,
    pub unit: Option<String>,
    pub queryable: bool,
    pub settable: bool,
}

/// A persisted property owned by a device (`P = DeviceId`) or a channel
/// (`P = ChannelId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property<P> {
    pub id: PropertyId,
    pub parent: P,
    pub identifier: String,
    pub name: Option<String>,
    pub data_type: DataType,
    pub format: Option<ValueFormat>,
    pub unit: Option<String>,
    /// Sentinel reading the device uses to flag an invalid value. `None`
    /// while unknown.
    pub invalid: Option<PropertyValue>,
    pub queryable: bool,
    pub settable: bool,
    /// Static value, only used by properties whose value is owned by the
    /// persisted model itself (the connection-state property).
    pub value: Option<PropertyValue>,
}

impl<P> Property<P> {
    pub fn descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor {
            identifier: self.identifier.clone(),
            name: self.name.clone(),
            data_type: self.data_type,
            format: self.format.clone(),
            unit: self.unit.clone(),
            queryable: self.queryable,
            settable: self.settable,
        }
    }
}

pub type DeviceProperty = Property<DeviceId>;
pub type ChannelProperty = Property<ChannelId>;

/// A named command capability of a device or channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control<P> {
    pub id: ControlId,
    pub parent: P,
    pub name: String,
}

pub type DeviceControl = Control<DeviceId>;
pub type ChannelControl = Control<ChannelId>;
