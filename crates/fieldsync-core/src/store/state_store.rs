// ── Property value state store ──
//
// In-memory `StateRepository`. Built disabled when the connector runs
// without state storage, in which case every call reports `Unsupported`.

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::CoreError;
use crate::model::{PropertyId, PropertyState};
use crate::repository::{PropertyStateRequest, StateRepository};

pub struct StateStore {
    states: Option<DashMap<PropertyId, PropertyState>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            states: Some(DashMap::new()),
        }
    }

    /// A store with no backend. Every operation fails with
    /// [`CoreError::Unsupported`].
    pub fn disabled() -> Self {
        Self { states: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.states.is_some()
    }

    /// Number of stored states. Zero when disabled.
    pub fn len(&self) -> usize {
        self.states.as_ref().map_or(0, DashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn backend(&self, operation: &str) -> Result<&DashMap<PropertyId, PropertyState>, CoreError> {
        self.states.as_ref().ok_or_else(|| CoreError::Unsupported {
            operation: operation.into(),
            required: "property state storage".into(),
        })
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

fn build_state(property: PropertyId, data: PropertyStateRequest) -> PropertyState {
    PropertyState {
        property,
        actual_value: data.actual_value,
        expected_value: data.expected_value,
        pending: data.pending,
        updated_at: Utc::now(),
    }
}

impl StateRepository for StateStore {
    fn get_by_id(&self, property: PropertyId) -> Result<Option<PropertyState>, CoreError> {
        let states = self.backend("get property state")?;
        Ok(states.get(&property).map(|r| r.value().clone()))
    }

    fn create(
        &self,
        property: PropertyId,
        data: PropertyStateRequest,
    ) -> Result<PropertyState, CoreError> {
        let states = self.backend("create property state")?;
        match states.entry(property) {
            Entry::Occupied(_) => Err(CoreError::conflict("property state", property)),
            Entry::Vacant(slot) => Ok(slot.insert(build_state(property, data)).clone()),
        }
    }

    fn update(
        &self,
        property: PropertyId,
        _state: &PropertyState,
        data: PropertyStateRequest,
    ) -> Result<PropertyState, CoreError> {
        let states = self.backend("update property state")?;
        let mut stored = states
            .get_mut(&property)
            .ok_or_else(|| CoreError::not_found("property state", property))?;
        *stored = build_state(property, data);
        Ok(stored.clone())
    }
}
