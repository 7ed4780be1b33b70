// ── Observed records ──
//
// Facts handed to the engine by the protocol client. Each record describes
// what the field currently reports; the engine converges the persisted
// model towards it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::ConnectionState;
use super::device::{FirmwareInfo, HardwareInfo};
use super::entity_id::{ChannelId, DeviceId, PropertyId};
use super::property::PropertyDescriptor;
use super::value::PropertyValue;

/// A device as announced by the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub identifier: String,
    pub name: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub hardware: HardwareInfo,
    #[serde(default)]
    pub firmware: FirmwareInfo,
    pub state: ConnectionState,
    /// Complete set of control names the device currently exposes.
    #[serde(default)]
    pub controls: Vec<String>,
}

fn enabled_by_default() -> bool {
    true
}

/// A channel as announced by the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: ChannelId,
    pub device: DeviceId,
    pub identifier: String,
    pub name: Option<String>,
    /// Complete set of control names the channel currently exposes.
    #[serde(default)]
    pub controls: Vec<String>,
}

/// A device or channel property as announced by the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord<P> {
    pub id: PropertyId,
    pub parent: P,
    #[serde(flatten)]
    pub descriptor: PropertyDescriptor,
}

/// A value report for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueReport {
    pub property: PropertyId,
    pub actual_value: Option<PropertyValue>,
    pub expected_value: Option<PropertyValue>,
    /// When the expected value was requested, if it is still unconfirmed.
    pub expected_pending: Option<DateTime<Utc>>,
}

impl ValueReport {
    /// An expected value exists and has not been confirmed yet.
    pub fn is_pending(&self) -> bool {
        self.expected_value.is_some() && self.expected_pending.is_some()
    }
}

/// A standalone connection-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub device: DeviceId,
    pub state: ConnectionState,
}

/// Partial firmware facts for an already known device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareReport {
    pub device: DeviceId,
    pub manufacturer: Option<String>,
    pub version: Option<String>,
}
