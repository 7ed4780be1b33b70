// ── Generic reactive entity collection ──
//
// Concurrent storage with O(1) lookups by id and by (parent, identifier),
// and push-based change notification via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::repository::Entity;

/// A concurrent, reactive collection for a single entity type.
///
/// Uses `DashMap` for lookups and a `watch` channel for push-based change
/// notification. Every mutation bumps a version counter and rebuilds the
/// snapshot that subscribers receive.
pub(crate) struct EntityCollection<E: Entity> {
    /// Primary storage: id -> entity.
    by_id: DashMap<E::Id, Arc<E>>,

    /// Secondary index: (parent, identifier) -> id. Enforces identifier
    /// uniqueness within a parent.
    by_identifier: DashMap<(E::Parent, String), E::Id>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<E>>>>,
}

impl<E: Entity> EntityCollection<E> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            by_identifier: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert a new entity. Fails if its id or its identifier within the
    /// parent is already taken.
    pub(crate) fn insert(&self, entity: E) -> Result<Arc<E>, CoreError> {
        let id = entity.id();
        if self.by_id.contains_key(&id) {
            return Err(CoreError::conflict(E::NAME, id));
        }

        let index_key = (entity.parent(), entity.identifier().to_owned());
        if self.by_identifier.contains_key(&index_key) {
            return Err(CoreError::conflict(E::NAME, &index_key.1));
        }

        let entity = Arc::new(entity);
        self.by_id.insert(id, Arc::clone(&entity));
        self.by_identifier.insert(index_key, id);

        self.rebuild_snapshot();
        self.bump_version();

        Ok(entity)
    }

    /// Replace a stored entity with a new version of itself.
    ///
    /// Parent linkage is immutable; a changed identifier moves the
    /// secondary index entry, provided the new one is free.
    pub(crate) fn replace(&self, entity: E) -> Result<Arc<E>, CoreError> {
        let id = entity.id();
        let previous = self
            .get(id)
            .ok_or_else(|| CoreError::not_found(E::NAME, id))?;

        if previous.parent() != entity.parent() {
            return Err(CoreError::ValidationFailed {
                message: format!("{} {id} cannot change its parent", E::NAME),
            });
        }

        if previous.identifier() != entity.identifier() {
            let new_key = (entity.parent(), entity.identifier().to_owned());
            if self.by_identifier.contains_key(&new_key) {
                return Err(CoreError::conflict(E::NAME, &new_key.1));
            }
            self.by_identifier
                .remove(&(previous.parent(), previous.identifier().to_owned()));
            self.by_identifier.insert(new_key, id);
        }

        let entity = Arc::new(entity);
        self.by_id.insert(id, Arc::clone(&entity));

        self.rebuild_snapshot();
        self.bump_version();

        Ok(entity)
    }

    /// Remove an entity by id. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, id: E::Id) -> Option<Arc<E>> {
        let removed = self.by_id.remove(&id).map(|(_, v)| v);
        if let Some(ref entity) = removed {
            self.by_identifier
                .remove(&(entity.parent(), entity.identifier().to_owned()));
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Remove every entity owned by `parent`. Returns the removed entities.
    pub(crate) fn remove_children(&self, parent: E::Parent) -> Vec<Arc<E>> {
        self.children(parent)
            .into_iter()
            .filter_map(|child| self.remove(child.id()))
            .collect()
    }

    pub(crate) fn get(&self, id: E::Id) -> Option<Arc<E>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn get_by_identifier(&self, parent: E::Parent, identifier: &str) -> Option<Arc<E>> {
        let id = *self
            .by_identifier
            .get(&(parent, identifier.to_owned()))?
            .value();
        self.get(id)
    }

    /// All entities owned by `parent`, ordered by identifier.
    pub(crate) fn children(&self, parent: E::Parent) -> Vec<Arc<E>> {
        let mut children: Vec<Arc<E>> = self
            .by_id
            .iter()
            .filter(|r| r.value().parent() == parent)
            .map(|r| Arc::clone(r.value()))
            .collect();
        children.sort_by(|a, b| a.identifier().cmp(b.identifier()));
        children
    }

    pub(crate) fn contains(&self, id: E::Id) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<E>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<E>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<E>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Control, ControlId, DeviceId};

    fn control(parent: DeviceId, name: &str) -> Control<DeviceId> {
        Control {
            id: ControlId::new(),
            parent,
            name: name.into(),
        }
    }

    #[test]
    fn insert_then_lookup_by_id_and_identifier() {
        let col = EntityCollection::new();
        let device = DeviceId::new();
        let reboot = col.insert(control(device, "reboot")).unwrap();

        assert_eq!(col.get(reboot.id).unwrap().name, "reboot");
        assert_eq!(col.get_by_identifier(device, "reboot").unwrap().id, reboot.id);
        assert!(col.get_by_identifier(DeviceId::new(), "reboot").is_none());
    }

    #[test]
    fn insert_rejects_duplicate_identifier_in_same_parent() {
        let col = EntityCollection::new();
        let device = DeviceId::new();
        col.insert(control(device, "reboot")).unwrap();

        let err = col.insert(control(device, "reboot")).unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));

        // Same name under another parent is fine.
        col.insert(control(DeviceId::new(), "reboot")).unwrap();
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let col = EntityCollection::new();
        let first = control(DeviceId::new(), "reboot");
        let mut clash = control(DeviceId::new(), "reset");
        clash.id = first.id;

        col.insert(first).unwrap();
        assert!(matches!(col.insert(clash), Err(CoreError::Conflict { .. })));
    }

    #[test]
    fn replace_moves_identifier_index() {
        let col = EntityCollection::new();
        let device = DeviceId::new();
        let stored = col.insert(control(device, "reboot")).unwrap();

        let mut renamed = (*stored).clone();
        renamed.name = "restart".into();
        col.replace(renamed).unwrap();

        assert!(col.get_by_identifier(device, "reboot").is_none());
        assert_eq!(col.get_by_identifier(device, "restart").unwrap().id, stored.id);
    }

    #[test]
    fn replace_refuses_parent_change() {
        let col = EntityCollection::new();
        let stored = col.insert(control(DeviceId::new(), "reboot")).unwrap();

        let mut moved = (*stored).clone();
        moved.parent = DeviceId::new();
        assert!(matches!(
            col.replace(moved),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn remove_cleans_up_indexes() {
        let col = EntityCollection::new();
        let device = DeviceId::new();
        let stored = col.insert(control(device, "reboot")).unwrap();

        assert!(col.remove(stored.id).is_some());
        assert!(col.get(stored.id).is_none());
        assert!(col.get_by_identifier(device, "reboot").is_none());
        assert!(col.remove(stored.id).is_none());
    }

    #[test]
    fn remove_children_only_touches_one_parent() {
        let col = EntityCollection::new();
        let device = DeviceId::new();
        let other = DeviceId::new();
        col.insert(control(device, "a")).unwrap();
        col.insert(control(device, "b")).unwrap();
        col.insert(control(other, "a")).unwrap();

        assert_eq!(col.remove_children(device).len(), 2);
        assert!(col.children(device).is_empty());
        assert_eq!(col.children(other).len(), 1);
    }

    #[test]
    fn children_are_ordered_by_identifier() {
        let col = EntityCollection::new();
        let device = DeviceId::new();
        for name in ["zeta", "alpha", "mid"] {
            col.insert(control(device, name)).unwrap();
        }

        let names: Vec<String> = col.children(device).iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn snapshot_and_version_track_mutations() {
        let col = EntityCollection::new();
        assert!(col.snapshot().is_empty());
        assert_eq!(col.version(), 0);

        let stored = col.insert(control(DeviceId::new(), "reboot")).unwrap();
        assert_eq!(col.snapshot().len(), 1);
        assert_eq!(col.version(), 1);

        col.remove(stored.id);
        assert!(col.snapshot().is_empty());
        assert_eq!(col.version(), 2);
    }
}
