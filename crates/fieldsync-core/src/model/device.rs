// ── Device domain types ──

use serde::{Deserialize, Serialize};

use super::entity_id::{ConnectorId, DeviceId};

/// Hardware description reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareInfo {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub version: Option<String>,
}

/// Firmware description reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareInfo {
    pub manufacturer: Option<String>,
    pub version: Option<String>,
}

/// A persisted device.
///
/// The connection state is not stored here: it lives in the synthetic
/// `state` property owned by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// Connector that discovered the device. Set once at creation.
    pub connector: ConnectorId,
    pub identifier: String,
    pub name: Option<String>,
    pub enabled: bool,
    pub hardware: HardwareInfo,
    pub firmware: FirmwareInfo,
}
