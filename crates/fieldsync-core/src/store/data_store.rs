// ── Central reactive data store ──
//
// In-memory reference implementation of every entity repository the
// engine depends on. Mutations are broadcast to subscribers via `watch`
// channels.

use std::str::FromStr;
use std::sync::Arc;

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{
    Channel, ChannelControl, ChannelId, ChannelProperty, ConnectionState, Device, DeviceControl,
    DeviceId, DeviceProperty, ParentId, STATE_PROPERTY_IDENTIFIER,
};
use crate::repository::{
    ChannelRepositories, DeviceRepositories, Entity, Repository, StateRepository,
};
use crate::stream::EntityStream;

/// Central reactive store for the persisted device model.
///
/// Thread-safe: reads are wait-free, writes use fine-grained per-shard
/// locks within `DashMap`. Children may only be created under an existing
/// parent, and deleting a parent removes everything it owns.
pub struct DataStore {
    pub(crate) devices: EntityCollection<Device>,
    pub(crate) channels: EntityCollection<Channel>,
    pub(crate) device_properties: EntityCollection<DeviceProperty>,
    pub(crate) channel_properties: EntityCollection<ChannelProperty>,
    pub(crate) device_controls: EntityCollection<DeviceControl>,
    pub(crate) channel_controls: EntityCollection<ChannelControl>,
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            devices: EntityCollection::new(),
            channels: EntityCollection::new(),
            device_properties: EntityCollection::new(),
            channel_properties: EntityCollection::new(),
            device_controls: EntityCollection::new(),
            channel_controls: EntityCollection::new(),
        }
    }

    // ── Repository families ──────────────────────────────────────────

    /// Device-side repositories backed by this store.
    pub fn device_repositories(
        self: &Arc<Self>,
        states: Arc<dyn StateRepository>,
    ) -> DeviceRepositories {
        DeviceRepositories {
            devices: Arc::clone(self) as Arc<dyn Repository<Device>>,
            properties: Arc::clone(self) as Arc<dyn Repository<DeviceProperty>>,
            controls: Arc::clone(self) as Arc<dyn Repository<DeviceControl>>,
            states,
        }
    }

    /// Channel-side repositories backed by this store.
    pub fn channel_repositories(
        self: &Arc<Self>,
        states: Arc<dyn StateRepository>,
    ) -> ChannelRepositories {
        ChannelRepositories {
            channels: Arc::clone(self) as Arc<dyn Repository<Channel>>,
            properties: Arc::clone(self) as Arc<dyn Repository<ChannelProperty>>,
            controls: Arc::clone(self) as Arc<dyn Repository<ChannelControl>>,
            states,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.snapshot()
    }

    pub fn channels_snapshot(&self) -> Arc<Vec<Arc<Channel>>> {
        self.channels.snapshot()
    }

    pub fn device_properties_snapshot(&self) -> Arc<Vec<Arc<DeviceProperty>>> {
        self.device_properties.snapshot()
    }

    pub fn channel_properties_snapshot(&self) -> Arc<Vec<Arc<ChannelProperty>>> {
        self.channel_properties.snapshot()
    }

    pub fn device_controls_snapshot(&self) -> Arc<Vec<Arc<DeviceControl>>> {
        self.device_controls.snapshot()
    }

    pub fn channel_controls_snapshot(&self) -> Arc<Vec<Arc<ChannelControl>>> {
        self.channel_controls.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn device_by_id(&self, id: DeviceId) -> Option<Arc<Device>> {
        self.devices.get(id)
    }

    pub fn device_by_identifier(&self, identifier: &str) -> Option<Arc<Device>> {
        self.devices.get_by_identifier((), identifier)
    }

    pub fn channel_by_id(&self, id: ChannelId) -> Option<Arc<Channel>> {
        self.channels.get(id)
    }

    /// Controls of a device, ordered by name.
    pub fn device_controls_of(&self, device: DeviceId) -> Vec<Arc<DeviceControl>> {
        self.device_controls.children(device)
    }

    /// Controls of a channel, ordered by name.
    pub fn channel_controls_of(&self, channel: ChannelId) -> Vec<Arc<ChannelControl>> {
        self.channel_controls.children(channel)
    }

    /// Persisted connection state of a device, read from its synthetic
    /// `state` property. `None` if the device has never reported one.
    pub fn device_state(&self, device: DeviceId) -> Option<ConnectionState> {
        let property = self
            .device_properties
            .get_by_identifier(device, STATE_PROPERTY_IDENTIFIER)?;
        let value = property.value.as_ref()?;
        ConnectionState::from_str(value.as_str()?).ok()
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn device_property_count(&self) -> usize {
        self.device_properties.len()
    }

    pub fn channel_property_count(&self) -> usize {
        self.channel_properties.len()
    }

    pub fn device_control_count(&self) -> usize {
        self.device_controls.len()
    }

    pub fn channel_control_count(&self) -> usize {
        self.channel_controls.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_devices(&self) -> EntityStream<Device> {
        EntityStream::new(self.devices.subscribe())
    }

    pub fn subscribe_channels(&self) -> EntityStream<Channel> {
        EntityStream::new(self.channels.subscribe())
    }

    pub fn subscribe_device_properties(&self) -> EntityStream<DeviceProperty> {
        EntityStream::new(self.device_properties.subscribe())
    }

    pub fn subscribe_channel_properties(&self) -> EntityStream<ChannelProperty> {
        EntityStream::new(self.channel_properties.subscribe())
    }

    pub fn subscribe_device_controls(&self) -> EntityStream<DeviceControl> {
        EntityStream::new(self.device_controls.subscribe())
    }

    pub fn subscribe_channel_controls(&self) -> EntityStream<ChannelControl> {
        EntityStream::new(self.channel_controls.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Sum of the mutation counters of every collection.
    pub fn version(&self) -> u64 {
        self.devices.version()
            + self.channels.version()
            + self.device_properties.version()
            + self.channel_properties.version()
            + self.device_controls.version()
            + self.channel_controls.version()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn remove_device_tree(&self, device: DeviceId) {
        for channel in self.channels.remove_children(device) {
            self.remove_channel_tree(channel.id);
        }
        self.device_properties.remove_children(device);
        self.device_controls.remove_children(device);
    }

    fn remove_channel_tree(&self, channel: ChannelId) {
        self.channel_properties.remove_children(channel);
        self.channel_controls.remove_children(channel);
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Table wiring ────────────────────────────────────────────────────

/// Per-entity view of the store: the backing collection, the parent
/// foreign key check and the cascade run after a delete.
trait Table<E: Entity> {
    fn table(&self) -> &EntityCollection<E>;
    fn check_parent(&self, parent: E::Parent) -> Result<(), CoreError>;
    fn on_delete(&self, entity: &E);
}

fn require_parent<P: ParentId>(exists: bool, parent: P) -> Result<(), CoreError> {
    if exists {
        Ok(())
    } else {
        Err(CoreError::not_found(P::ENTITY, parent))
    }
}

impl Table<Device> for DataStore {
    fn table(&self) -> &EntityCollection<Device> {
        &self.devices
    }

    fn check_parent(&self, (): ()) -> Result<(), CoreError> {
        Ok(())
    }

    fn on_delete(&self, entity: &Device) {
        self.remove_device_tree(entity.id);
    }
}

impl Table<Channel> for DataStore {
    fn table(&self) -> &EntityCollection<Channel> {
        &self.channels
    }

    fn check_parent(&self, parent: DeviceId) -> Result<(), CoreError> {
        require_parent(self.devices.contains(parent), parent)
    }

    fn on_delete(&self, entity: &Channel) {
        self.remove_channel_tree(entity.id);
    }
}

impl Table<DeviceProperty> for DataStore {
    fn table(&self) -> &EntityCollection<DeviceProperty> {
        &self.device_properties
    }

    fn check_parent(&self, parent: DeviceId) -> Result<(), CoreError> {
        require_parent(self.devices.contains(parent), parent)
    }

    fn on_delete(&self, _: &DeviceProperty) {}
}

impl Table<ChannelProperty> for DataStore {
    fn table(&self) -> &EntityCollection<ChannelProperty> {
        &self.channel_properties
    }

    fn check_parent(&self, parent: ChannelId) -> Result<(), CoreError> {
        require_parent(self.channels.contains(parent), parent)
    }

    fn on_delete(&self, _: &ChannelProperty) {}
}

impl Table<DeviceControl> for DataStore {
    fn table(&self) -> &EntityCollection<DeviceControl> {
        &self.device_controls
    }

    fn check_parent(&self, parent: DeviceId) -> Result<(), CoreError> {
        require_parent(self.devices.contains(parent), parent)
    }

    fn on_delete(&self, _: &DeviceControl) {}
}

impl Table<ChannelControl> for DataStore {
    fn table(&self) -> &EntityCollection<ChannelControl> {
        &self.channel_controls
    }

    fn check_parent(&self, parent: ChannelId) -> Result<(), CoreError> {
        require_parent(self.channels.contains(parent), parent)
    }

    fn on_delete(&self, _: &ChannelControl) {}
}

impl DataStore {
    fn create_entity<E>(&self, data: E::Create) -> Result<Arc<E>, CoreError>
    where
        E: Entity,
        Self: Table<E>,
    {
        let entity = E::from_request(data);
        Table::<E>::check_parent(self, entity.parent())?;
        Table::<E>::table(self).insert(entity)
    }

    fn update_entity<E>(&self, entity: &E, data: E::Update) -> Result<Arc<E>, CoreError>
    where
        E: Entity,
        Self: Table<E>,
    {
        let table = Table::<E>::table(self);
        let stored = table
            .get(entity.id())
            .ok_or_else(|| CoreError::not_found(E::NAME, entity.id()))?;
        let mut updated = E::clone(&stored);
        updated.apply(data);
        table.replace(updated)
    }

    fn delete_entity<E>(&self, entity: &E) -> Result<(), CoreError>
    where
        E: Entity,
        Self: Table<E>,
    {
        let removed = Table::<E>::table(self)
            .remove(entity.id())
            .ok_or_else(|| CoreError::not_found(E::NAME, entity.id()))?;
        Table::<E>::on_delete(self, &removed);
        Ok(())
    }
}

macro_rules! store_repository {
    ($($entity:ty),+ $(,)?) => {$(
        impl Repository<$entity> for DataStore {
            fn get_by_id(
                &self,
                id: <$entity as Entity>::Id,
            ) -> Result<Option<Arc<$entity>>, CoreError> {
                Ok(Table::<$entity>::table(self).get(id))
            }

            fn get_by_identifier(
                &self,
                parent: <$entity as Entity>::Parent,
                identifier: &str,
            ) -> Result<Option<Arc<$entity>>, CoreError> {
                Ok(Table::<$entity>::table(self).get_by_identifier(parent, identifier))
            }

            fn get_all_by_parent(
                &self,
                parent: <$entity as Entity>::Parent,
            ) -> Result<Vec<Arc<$entity>>, CoreError> {
                Ok(Table::<$entity>::table(self).children(parent))
            }

            fn create(
                &self,
                data: <$entity as Entity>::Create,
            ) -> Result<Arc<$entity>, CoreError> {
                self.create_entity::<$entity>(data)
            }

            fn update(
                &self,
                entity: &$entity,
                data: <$entity as Entity>::Update,
            ) -> Result<Arc<$entity>, CoreError> {
                self.update_entity(entity, data)
            }

            fn delete(&self, entity: &$entity) -> Result<(), CoreError> {
                self.delete_entity(entity)
            }
        }
    )+};
}

store_repository!(
    Device,
    Channel,
    DeviceProperty,
    ChannelProperty,
    DeviceControl,
    ChannelControl,
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{
        ConnectorId, DataType, FirmwareInfo, HardwareInfo, PropertyDescriptor, PropertyId,
        PropertyValue,
    };
    use crate::repository::{
        CreateChannelRequest, CreateControlRequest, CreateDeviceRequest, CreatePropertyRequest,
        DeviceDetails, UpdateDeviceRequest,
    };

    fn create_device(store: &DataStore, identifier: &str) -> Arc<Device> {
        Repository::<Device>::create(
            store,
            CreateDeviceRequest {
                id: DeviceId::new(),
                connector: ConnectorId::new(),
                identifier: identifier.into(),
                name: None,
                enabled: true,
                hardware: HardwareInfo::default(),
                firmware: FirmwareInfo::default(),
            },
        )
        .unwrap()
    }

    fn create_channel(store: &DataStore, device: DeviceId, identifier: &str) -> Arc<Channel> {
        Repository::<Channel>::create(
            store,
            CreateChannelRequest {
                id: ChannelId::new(),
                device,
                identifier: identifier.into(),
                name: None,
            },
        )
        .unwrap()
    }

    fn state_descriptor() -> PropertyDescriptor {
        PropertyDescriptor {
            identifier: STATE_PROPERTY_IDENTIFIER.into(),
            name: None,
            data_type: DataType::Enum,
            format: Some(ConnectionState::format()),
            unit: None,
            queryable: false,
            settable: false,
        }
    }

    #[test]
    fn child_under_missing_parent_is_rejected() {
        let store = DataStore::new();
        let err = Repository::<Channel>::create(
            &store,
            CreateChannelRequest {
                id: ChannelId::new(),
                device: DeviceId::new(),
                identifier: "relay".into(),
                name: None,
            },
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::NotFound { .. }));
        assert_eq!(store.channel_count(), 0);
    }

    #[test]
    fn deleting_a_device_cascades() {
        let store = DataStore::new();
        let device = create_device(&store, "sensor");
        let channel = create_channel(&store, device.id, "relay");

        Repository::<ChannelControl>::create(
            &store,
            CreateControlRequest {
                parent: channel.id,
                name: "toggle".into(),
            },
        )
        .unwrap();
        Repository::<DeviceControl>::create(
            &store,
            CreateControlRequest {
                parent: device.id,
                name: "reboot".into(),
            },
        )
        .unwrap();

        Repository::<Device>::delete(&store, &device).unwrap();

        assert_eq!(store.device_count(), 0);
        assert_eq!(store.channel_count(), 0);
        assert_eq!(store.device_control_count(), 0);
        assert_eq!(store.channel_control_count(), 0);
    }

    #[test]
    fn update_applies_to_stored_copy() {
        let store = DataStore::new();
        let device = create_device(&store, "sensor");

        let updated = Repository::<Device>::update(
            &store,
            &device,
            UpdateDeviceRequest::Observe(DeviceDetails {
                identifier: "sensor".into(),
                name: Some("Sensor".into()),
                enabled: true,
                hardware: HardwareInfo::default(),
                firmware: FirmwareInfo::default(),
            }),
        )
        .unwrap();

        assert_eq!(updated.id, device.id);
        assert_eq!(store.device_by_id(device.id).unwrap().name.as_deref(), Some("Sensor"));
        assert_eq!(store.device_by_identifier("sensor").unwrap().id, device.id);
    }

    #[test]
    fn delete_of_unknown_entity_is_not_found() {
        let store = DataStore::new();
        let device = create_device(&store, "sensor");
        Repository::<Device>::delete(&store, &device).unwrap();

        assert!(matches!(
            Repository::<Device>::delete(&store, &device),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn device_state_reads_synthetic_property() {
        let store = DataStore::new();
        let device = create_device(&store, "sensor");
        assert_eq!(store.device_state(device.id), None);

        Repository::<DeviceProperty>::create(
            &store,
            CreatePropertyRequest {
                id: PropertyId::new(),
                parent: device.id,
                descriptor: state_descriptor(),
                value: Some(PropertyValue::from("running")),
            },
        )
        .unwrap();

        assert_eq!(store.device_state(device.id), Some(ConnectionState::Running));
    }

    #[test]
    fn families_share_the_store() {
        let store = Arc::new(DataStore::new());
        let states: Arc<dyn StateRepository> = Arc::new(crate::store::StateStore::disabled());
        let devices = store.device_repositories(Arc::clone(&states));
        let channels = store.channel_repositories(states);

        let device = create_device(&store, "sensor");
        assert!(devices.devices.get_by_id(device.id).unwrap().is_some());
        assert!(
            channels
                .channels
                .get_all_by_parent(device.id)
                .unwrap()
                .is_empty()
        );
    }
}
