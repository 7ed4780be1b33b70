// ── Typed request structs for repository writes ──
//
// Every create/update handed to a repository uses one of these instead of
// a loosely typed field map.

use serde::{Deserialize, Serialize};

use crate::model::{
    ChannelId, ConnectorId, DeviceId, FirmwareInfo, HardwareInfo, PropertyDescriptor, PropertyId,
    PropertyValue,
};

// ── Device ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceRequest {
    pub id: DeviceId,
    pub connector: ConnectorId,
    pub identifier: String,
    pub name: Option<String>,
    pub enabled: bool,
    pub hardware: HardwareInfo,
    pub firmware: FirmwareInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UpdateDeviceRequest {
    /// Replace every observed field with what the device announced.
    /// Identity and owning connector never change.
    Observe(DeviceDetails),
    /// Merge partial firmware facts. `None` leaves the stored field.
    Firmware {
        manufacturer: Option<String>,
        version: Option<String>,
    },
}

/// The mutable half of a device, as announced by the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDetails {
    pub identifier: String,
    pub name: Option<String>,
    pub enabled: bool,
    pub hardware: HardwareInfo,
    pub firmware: FirmwareInfo,
}

// ── Channel ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChannelRequest {
    pub id: ChannelId,
    pub device: DeviceId,
    pub identifier: String,
    pub name: Option<String>,
}

/// Full replacement of a channel's descriptive fields. The owning device
/// never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateChannelRequest {
    pub identifier: String,
    pub name: Option<String>,
}

// ── Property ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePropertyRequest<P> {
    pub id: PropertyId,
    pub parent: P,
    pub descriptor: PropertyDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UpdatePropertyRequest {
    /// Replace every descriptive field. Resets the validity marker.
    Describe(PropertyDescriptor),
    /// Replace only the static value.
    Value(Option<PropertyValue>),
    /// Record the sentinel the device uses to flag an invalid reading.
    Invalid(Option<PropertyValue>),
}

// ── Control ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateControlRequest<P> {
    pub parent: P,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateControlRequest {
    pub name: String,
}

// ── Property state ─────────────────────────────────────────────────

/// Full replacement of a property state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyStateRequest {
    pub actual_value: Option<PropertyValue>,
    pub expected_value: Option<PropertyValue>,
    pub pending: bool,
}
