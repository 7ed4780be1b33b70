// ── Channel domain type ──

use serde::{Deserialize, Serialize};

use super::entity_id::{ChannelId, DeviceId};

/// A persisted channel, bound to exactly one device for its whole life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub device: DeviceId,
    pub identifier: String,
    pub name: Option<String>,
}
