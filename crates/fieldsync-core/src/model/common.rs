// ── Common types shared across the domain model ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Identifier reserved for the synthetic connection-state property every
/// device carries.
pub const STATE_PROPERTY_IDENTIFIER: &str = "state";

/// Device connection lifecycle, as reported by the field protocol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Init,
    Ready,
    Running,
    Sleeping,
    Stopped,
    Lost,
    Alert,
    Unknown,
}

impl ConnectionState {
    /// Every state in declaration order, as the allowed-values list of the
    /// synthetic state property.
    pub fn format() -> ValueFormat {
        ValueFormat::Values(Self::iter().map(|s| s.to_string()).collect())
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Connected | Self::Ready | Self::Running)
    }
}

/// Data type of a property value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataType {
    Char,
    Uchar,
    Short,
    Ushort,
    Int,
    Uint,
    Float,
    Boolean,
    String,
    Enum,
    Date,
    Time,
    Datetime,
    Button,
    Switch,
    Unknown,
}

impl DataType {
    /// Inclusive bounds of the integer kinds. `None` for everything else.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::Char => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
            Self::Uchar => Some((0, i64::from(u8::MAX))),
            Self::Short => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Self::Ushort => Some((0, i64::from(u16::MAX))),
            Self::Int => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Self::Uint => Some((0, i64::from(u32::MAX))),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.integer_bounds().is_some() || matches!(self, Self::Float)
    }
}

/// Value format descriptor: a numeric range or a list of allowed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueFormat {
    Range { min: Option<f64>, max: Option<f64> },
    Values(Vec<String>),
}

impl ValueFormat {
    /// Whether `value` lies inside the range. Value lists accept any number.
    pub fn contains_number(&self, value: f64) -> bool {
        match self {
            Self::Range { min, max } => {
                min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
            }
            Self::Values(_) => true,
        }
    }

    /// Whether `value` is one of the allowed values. Ranges accept any text.
    pub fn contains_item(&self, value: &str) -> bool {
        match self {
            Self::Values(items) => items.iter().any(|item| item == value),
            Self::Range { .. } => true,
        }
    }
}
