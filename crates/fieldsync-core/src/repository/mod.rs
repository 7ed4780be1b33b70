// ── Persistence contracts ──
//
// The engine never talks to a storage engine directly. It depends on these
// capability traits, grouped per entity family, and on whatever
// implementation the embedding process wires in (the in-memory `DataStore`
// in this crate, or a database-backed one elsewhere).

mod entity;
pub mod requests;

use std::sync::Arc;

pub use entity::Entity;
pub use requests::{
    CreateChannelRequest, CreateControlRequest, CreateDeviceRequest, CreatePropertyRequest,
    DeviceDetails, PropertyStateRequest, UpdateChannelRequest, UpdateControlRequest, UpdateDeviceRequest,
    UpdatePropertyRequest,
};

use crate::error::CoreError;
use crate::model::{
    Channel, ChannelControl, ChannelProperty, Device, DeviceControl, DeviceProperty, PropertyId,
    PropertyState,
};

/// Lookup and lifecycle operations for one entity type.
///
/// Lookups that find nothing return `Ok(None)` (or an empty list); errors
/// are reserved for failures of the storage itself and for writes that
/// would break an invariant (duplicate identity, missing parent).
pub trait Repository<E: Entity>: Send + Sync {
    fn get_by_id(&self, id: E::Id) -> Result<Option<Arc<E>>, CoreError>;

    fn get_by_identifier(
        &self,
        parent: E::Parent,
        identifier: &str,
    ) -> Result<Option<Arc<E>>, CoreError>;

    fn get_all_by_parent(&self, parent: E::Parent) -> Result<Vec<Arc<E>>, CoreError>;

    fn create(&self, data: E::Create) -> Result<Arc<E>, CoreError>;

    fn update(&self, entity: &E, data: E::Update) -> Result<Arc<E>, CoreError>;

    /// Delete the entity. Removal of owned children is the implementation's
    /// responsibility.
    fn delete(&self, entity: &E) -> Result<(), CoreError>;
}

/// Current value state of properties.
///
/// Every operation fails with [`CoreError::Unsupported`] when no state
/// backend is configured.
pub trait StateRepository: Send + Sync {
    fn get_by_id(&self, property: PropertyId) -> Result<Option<PropertyState>, CoreError>;

    fn create(
        &self,
        property: PropertyId,
        data: PropertyStateRequest,
    ) -> Result<PropertyState, CoreError>;

    fn update(
        &self,
        property: PropertyId,
        state: &PropertyState,
        data: PropertyStateRequest,
    ) -> Result<PropertyState, CoreError>;
}

/// Everything the engine persists about devices.
#[derive(Clone)]
pub struct DeviceRepositories {
    pub devices: Arc<dyn Repository<Device>>,
    pub properties: Arc<dyn Repository<DeviceProperty>>,
    pub controls: Arc<dyn Repository<DeviceControl>>,
    pub states: Arc<dyn StateRepository>,
}

/// Everything the engine persists about channels.
#[derive(Clone)]
pub struct ChannelRepositories {
    pub channels: Arc<dyn Repository<Channel>>,
    pub properties: Arc<dyn Repository<ChannelProperty>>,
    pub controls: Arc<dyn Repository<ChannelControl>>,
    pub states: Arc<dyn StateRepository>,
}
