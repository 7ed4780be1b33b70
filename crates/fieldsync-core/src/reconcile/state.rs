// ── Connection state and value state ──

use tracing::{debug, trace, warn};

use super::Reconciler;
use crate::error::CoreError;
use crate::model::{
    ConnectionState, DataType, Device, ParentId, Property, PropertyDescriptor, PropertyId,
    PropertyValue, STATE_PROPERTY_IDENTIFIER, ValueReport,
};
use crate::repository::{
    CreatePropertyRequest, PropertyStateRequest, Repository, StateRepository,
    UpdatePropertyRequest,
};

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

impl Reconciler {
    /// Mirror the connection state into the device's synthetic `state`
    /// property, creating it on first need.
    pub(super) fn write_device_state(
        &self,
        device: &Device,
        state: ConnectionState,
    ) -> Result<(), CoreError> {
        let repo = self.devices.properties.as_ref();
        let value = Some(PropertyValue::from(state.to_string()));

        match repo.get_by_identifier(device.id, STATE_PROPERTY_IDENTIFIER)? {
            None => {
                let property = repo.create(CreatePropertyRequest {
                    id: PropertyId::new(),
                    parent: device.id,
                    descriptor: state_descriptor(),
                    value,
                })?;
                debug!(device = %device.id, property = %property.id, %state, "state property created");
            }
            Some(property) if property.value == value => {
                trace!(device = %device.id, %state, "state unchanged");
            }
            Some(property) => {
                repo.update(&property, UpdatePropertyRequest::Value(value))?;
                debug!(device = %device.id, %state, "device state updated");
            }
        }
        Ok(())
    }
}

/// Write a value report through to the state store.
///
/// Reports for unknown properties are dropped. A state store without a
/// backend aborts the write with a warning; any other failure propagates.
pub(super) fn write_value<P: ParentId>(
    properties: &dyn Repository<Property<P>>,
    states: &dyn StateRepository,
    report: &ValueReport,
) -> Result<(), CoreError> {
    let Some(property) = properties.get_by_id(report.property)? else {
        debug!(property = %report.property, kind = P::ENTITY, "value for unknown property dropped");
        return Ok(());
    };

    let current = match states.get_by_id(property.id) {
        Ok(current) => current,
        Err(e) if e.is_unsupported() => {
            warn!(property = %property.id, "state storage is not configured, state could not be fetched");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let request = PropertyStateRequest {
        actual_value: report.actual_value.clone(),
        expected_value: report.expected_value.clone(),
        pending: report.is_pending(),
    };
    let written = match current {
        None => states.create(property.id, request),
        Some(state) => states.update(property.id, &state, request),
    };

    match written {
        Ok(state) => {
            debug!(property = %property.id, pending = state.pending, "property state saved");
            Ok(())
        }
        Err(e) if e.is_unsupported() => {
            warn!(property = %property.id, "state storage is not configured, state could not be saved");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
