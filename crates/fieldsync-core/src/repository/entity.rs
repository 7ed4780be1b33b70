// ── Persisted entity contract ──
//
// What a repository needs to know about an entity type: its identity, its
// parent, the slug that is unique within that parent, and how to build or
// mutate it from a typed request.

use std::fmt;
use std::hash::Hash;

use super::requests::{
    CreateChannelRequest, CreateControlRequest, CreateDeviceRequest, CreatePropertyRequest,
    UpdateChannelRequest, UpdateControlRequest, UpdateDeviceRequest, UpdatePropertyRequest,
};
use crate::model::{
    Channel, Control, ControlId, Device, DeviceId, ParentId, Property, PropertyId,
};

/// A persisted entity type.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// Id of the owning entity; `()` for top-level entities.
    type Parent: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    type Create: Send;
    type Update: Send;

    /// Entity type name used in errors and log fields.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;
    fn parent(&self) -> Self::Parent;
    /// Slug unique among the entities sharing a parent.
    fn identifier(&self) -> &str;

    fn from_request(data: Self::Create) -> Self;
    fn apply(&mut self, data: Self::Update);
}

impl Entity for Device {
    type Id = DeviceId;
    type Parent = ();
    type Create = CreateDeviceRequest;
    type Update = UpdateDeviceRequest;

    const NAME: &'static str = "device";

    fn id(&self) -> DeviceId {
        self.id
    }

    fn parent(&self) {}

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn from_request(data: CreateDeviceRequest) -> Self {
        Self {
            id: data.id,
            connector: data.connector,
            identifier: data.identifier,
            name: data.name,
            enabled: data.enabled,
            hardware: data.hardware,
            firmware: data.firmware,
        }
    }

    fn apply(&mut self, data: UpdateDeviceRequest) {
        match data {
            UpdateDeviceRequest::Observe(details) => {
                self.identifier = details.identifier;
                self.name = details.name;
                self.enabled = details.enabled;
                self.hardware = details.hardware;
                self.firmware = details.firmware;
            }
            UpdateDeviceRequest::Firmware {
                manufacturer,
                version,
            } => {
                if let Some(manufacturer) = manufacturer {
                    self.firmware.manufacturer = Some(manufacturer);
                }
                if let Some(version) = version {
                    self.firmware.version = Some(version);
                }
            }
        }
    }
}

impl Entity for Channel {
    type Id = crate::model::ChannelId;
    type Parent = DeviceId;
    type Create = CreateChannelRequest;
    type Update = UpdateChannelRequest;

    const NAME: &'static str = "channel";

    fn id(&self) -> Self::Id {
        self.id
    }

    fn parent(&self) -> DeviceId {
        self.device
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn from_request(data: CreateChannelRequest) -> Self {
        Self {
            id: data.id,
            device: data.device,
            identifier: data.identifier,
            name: data.name,
        }
    }

    fn apply(&mut self, data: UpdateChannelRequest) {
        self.identifier = data.identifier;
        self.name = data.name;
    }
}

impl<P: ParentId> Entity for Property<P> {
    type Id = PropertyId;
    type Parent = P;
    type Create = CreatePropertyRequest<P>;
    type Update = UpdatePropertyRequest;

    const NAME: &'static str = "property";

    fn id(&self) -> PropertyId {
        self.id
    }

    fn parent(&self) -> P {
        self.parent
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn from_request(data: CreatePropertyRequest<P>) -> Self {
        let descriptor = data.descriptor;
        Self {
            id: data.id,
            parent: data.parent,
            identifier: descriptor.identifier,
            name: descriptor.name,
            data_type: descriptor.data_type,
            format: descriptor.format,
            unit: descriptor.unit,
            invalid: None,
            queryable: descriptor.queryable,
            settable: descriptor.settable,
            value: data.value,
        }
    }

    fn apply(&mut self, data: UpdatePropertyRequest) {
        match data {
            UpdatePropertyRequest::Describe(descriptor) => {
                self.identifier = descriptor.identifier;
                self.name = descriptor.name;
                self.data_type = descriptor.data_type;
                self.format = descriptor.format;
                self.unit = descriptor.unit;
                self.queryable = descriptor.queryable;
                self.settable = descriptor.settable;
                self.invalid = None;
            }
            UpdatePropertyRequest::Value(value) => self.value = value,
            UpdatePropertyRequest::Invalid(invalid) => self.invalid = invalid,
        }
    }
}

impl<P: ParentId> Entity for Control<P> {
    type Id = ControlId;
    type Parent = P;
    type Create = CreateControlRequest<P>;
    type Update = UpdateControlRequest;

    const NAME: &'static str = "control";

    fn id(&self) -> ControlId {
        self.id
    }

    fn parent(&self) -> P {
        self.parent
    }

    fn identifier(&self) -> &str {
        &self.name
    }

    fn from_request(data: CreateControlRequest<P>) -> Self {
        Self {
            id: ControlId::new(),
            parent: data.parent,
            name: data.name,
        }
    }

    fn apply(&mut self, data: UpdateControlRequest) {
        self.name = data.name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataType, PropertyDescriptor, PropertyValue};
    use crate::repository::requests::DeviceDetails;

    fn descriptor(identifier: &str) -> PropertyDescriptor {
        PropertyDescriptor {
            identifier: identifier.into(),
            name: None,
            data_type: DataType::Float,
            format: None,
            unit: Some("°C".into()),
            queryable: true,
            settable: false,
        }
    }

    #[test]
    fn describe_resets_validity_marker() {
        let mut property = Property::from_request(CreatePropertyRequest {
            id: PropertyId::new(),
            parent: DeviceId::new(),
            descriptor: descriptor("temperature"),
            value: None,
        });
        property.invalid = Some(PropertyValue::Int(-127));

        property.apply(UpdatePropertyRequest::Describe(descriptor("temperature")));
        assert_eq!(property.invalid, None);
    }

    #[test]
    fn value_update_keeps_descriptor() {
        let mut property = Property::from_request(CreatePropertyRequest {
            id: PropertyId::new(),
            parent: DeviceId::new(),
            descriptor: descriptor("state"),
            value: Some(PropertyValue::from("init")),
        });
        let before = property.descriptor();

        property.apply(UpdatePropertyRequest::Value(Some(PropertyValue::from("ready"))));
        assert_eq!(property.descriptor(), before);
        assert_eq!(property.value, Some(PropertyValue::from("ready")));
    }

    fn sensor() -> Device {
        Device::from_request(CreateDeviceRequest {
            id: DeviceId::new(),
            connector: crate::model::ConnectorId::new(),
            identifier: "sensor".into(),
            name: Some("Sensor".into()),
            enabled: true,
            hardware: crate::model::HardwareInfo::default(),
            firmware: crate::model::FirmwareInfo {
                manufacturer: Some("fastybird".into()),
                version: Some("1.0.0".into()),
            },
        })
    }

    #[test]
    fn firmware_update_leaves_unset_fields() {
        let mut device = sensor();

        device.apply(UpdateDeviceRequest::Firmware {
            manufacturer: None,
            version: Some("1.1.0".into()),
        });

        assert_eq!(device.name.as_deref(), Some("Sensor"));
        assert_eq!(device.firmware.manufacturer.as_deref(), Some("fastybird"));
        assert_eq!(device.firmware.version.as_deref(), Some("1.1.0"));
    }

    #[test]
    fn observe_update_replaces_every_field() {
        let mut device = sensor();
        let id = device.id;
        let connector = device.connector;

        device.apply(UpdateDeviceRequest::Observe(DeviceDetails {
            identifier: "sensor".into(),
            name: None,
            enabled: false,
            hardware: crate::model::HardwareInfo::default(),
            firmware: crate::model::FirmwareInfo::default(),
        }));

        assert_eq!(device.id, id);
        assert_eq!(device.connector, connector);
        assert_eq!(device.name, None);
        assert!(!device.enabled);
        assert_eq!(device.firmware, crate::model::FirmwareInfo::default());
    }
}
