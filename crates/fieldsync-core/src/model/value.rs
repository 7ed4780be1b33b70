// ── Property values ──
//
// Typed values carried by value reports and stored in property state,
// plus normalisation of raw protocol payloads.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{DataType, ValueFormat};

/// Placeholder the field protocol publishes when a reading is unavailable.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single property reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    /// Normalise a raw payload according to the property's data type and
    /// format. Returns `None` for the `N/A` placeholder, unparsable payloads
    /// and values outside the declared range or value list.
    pub fn normalize(data_type: DataType, raw: &str, format: Option<&ValueFormat>) -> Option<Self> {
        let raw = raw.trim();
        if raw == NOT_AVAILABLE {
            return None;
        }

        if let Some((lower, upper)) = data_type.integer_bounds() {
            let value: i64 = raw.parse().ok()?;
            if value < lower || value > upper {
                return None;
            }
            let numeric: f64 = raw.parse().ok()?;
            return format
                .is_none_or(|f| f.contains_number(numeric))
                .then_some(Self::Int(value));
        }

        match data_type {
            DataType::Float => {
                let value: f64 = raw.parse().ok()?;
                (value.is_finite() && format.is_none_or(|f| f.contains_number(value)))
                    .then_some(Self::Float(value))
            }
            DataType::Boolean => parse_bool(raw).map(Self::Bool),
            DataType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|_| Self::Text(raw.to_owned())),
            DataType::Time => NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .ok()
                .map(|_| Self::Text(raw.to_owned())),
            DataType::Datetime => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|_| Self::Text(raw.to_owned())),
            DataType::Enum | DataType::Button | DataType::Switch => format
                .is_none_or(|f| f.contains_item(raw))
                .then(|| Self::Text(raw.to_owned())),
            _ => Some(Self::Text(raw.to_owned())),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "t" | "y" | "yes" | "on" => Some(true),
        "false" | "0" | "f" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}
