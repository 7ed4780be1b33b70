// ── Core identity types ──
//
// Typed UUID wrappers for every persisted entity. Each entity family gets
// its own id type so a channel id can never be passed where a device id is
// expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use uuid::Uuid;

/// Id of an entity that can own properties and controls.
///
/// Implemented by [`DeviceId`] and [`ChannelId`]; generic property and
/// control handling is written against this bound.
pub trait ParentId:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Entity type name used in errors and log fields.
    const ENTITY: &'static str;
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identity of a persisted device.
    DeviceId
);

uuid_id!(
    /// Identity of a persisted channel.
    ChannelId
);

uuid_id!(
    /// Identity of a device or channel property.
    PropertyId
);

uuid_id!(
    /// Identity of a device or channel control.
    ControlId
);

uuid_id!(
    /// Identity of the connector that discovered a device.
    ConnectorId
);

impl ParentId for DeviceId {
    const ENTITY: &'static str = "device";
}

impl ParentId for ChannelId {
    const ENTITY: &'static str = "channel";
}
