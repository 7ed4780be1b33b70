// fieldsync-core: Event-driven reconciliation of a persisted IoT device
// model, plus MQTT subscription correlation.

pub mod config;
pub mod connector;
pub mod error;
pub mod event;
pub mod model;
pub mod reconcile;
pub mod repository;
pub mod store;
pub mod stream;
pub mod subscription;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectorConfig, DEFAULT_CONNECTOR_IDENTIFIER};
pub use connector::Connector;
pub use error::CoreError;
pub use event::{ConnectorEvent, EventDispatcher, EventKind, Listener, ListenerHandle};
pub use reconcile::{HANDLED_EVENTS, Reconciler};
pub use repository::requests::*;
pub use repository::{
    ChannelRepositories, DeviceRepositories, Entity, Repository, StateRepository,
};
pub use store::{DataStore, StateStore};
pub use stream::{EntityStream, EntityWatchStream};
pub use subscription::{QoS, Subscription, SubscriptionRegistry};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Identity
    ChannelId, ConnectorId, ControlId, DeviceId, ParentId, PropertyId,
    // Persisted entities
    Channel, ChannelControl, ChannelProperty, Control, Device, DeviceControl, DeviceProperty,
    FirmwareInfo, HardwareInfo, Property, PropertyDescriptor, PropertyState,
    // Observed records
    ChannelRecord, DeviceRecord, FirmwareReport, PropertyRecord, StateChange, ValueReport,
    // Values
    ConnectionState, DataType, NOT_AVAILABLE, PropertyValue, STATE_PROPERTY_IDENTIFIER,
    ValueFormat,
};
