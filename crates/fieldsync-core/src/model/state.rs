// ── Property state ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::PropertyId;
use super::value::PropertyValue;

/// Current value state of one property. Keyed by the property id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyState {
    pub property: PropertyId,
    pub actual_value: Option<PropertyValue>,
    pub expected_value: Option<PropertyValue>,
    /// True while an expected value awaits confirmation from the field.
    pub pending: bool,
    pub updated_at: DateTime<Utc>,
}
