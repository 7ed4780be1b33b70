// ── Runtime connector configuration ──
//
// Describes the connector run the core is wired into. Never touches disk:
// `fieldsync-config` (or any embedding process) builds a `ConnectorConfig`
// and hands it in.

use crate::model::ConnectorId;

/// Default identifier for a connector when none is configured.
pub const DEFAULT_CONNECTOR_IDENTIFIER: &str = "fb-mqtt";

/// Configuration for a single connector run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Id stamped on every device this connector creates.
    pub connector_id: ConnectorId,
    /// Human-readable connector slug, used in log fields.
    pub identifier: String,
    /// Whether property value state is persisted. When disabled the state
    /// store reports itself unsupported and value reports are dropped.
    pub state_storage: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            connector_id: ConnectorId::new(),
            identifier: DEFAULT_CONNECTOR_IDENTIFIER.into(),
            state_storage: true,
        }
    }
}
