// ── Reactive entity streams ──
//
// Subscription types for following changes to the persisted model.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::repository::Entity;

/// A subscription to one entity collection of the [`DataStore`].
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
///
/// [`DataStore`]: crate::store::DataStore
pub struct EntityStream<E: Entity> {
    current: Arc<Vec<Arc<E>>>,
    receiver: watch::Receiver<Arc<Vec<Arc<E>>>>,
}

impl<E: Entity> EntityStream<E> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<Arc<E>>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last
    /// `changed()`).
    pub fn current(&self) -> &Arc<Vec<Arc<E>>> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<Vec<Arc<E>>> {
        self.receiver.borrow().clone()
    }

    /// Look up one entity in the current snapshot.
    pub fn get(&self, id: E::Id) -> Option<Arc<E>> {
        self.current.iter().find(|e| e.id() == id).cloned()
    }

    /// Entities of the current snapshot owned by `parent`.
    pub fn children_of(&self, parent: E::Parent) -> Vec<Arc<E>> {
        self.current
            .iter()
            .filter(|e| e.parent() == parent)
            .cloned()
            .collect()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the sender (DataStore) has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<E>>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> EntityWatchStream<E> {
        EntityWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current snapshot first, then a new one each time the
/// underlying collection is mutated.
pub struct EntityWatchStream<E: Entity> {
    inner: WatchStream<Arc<Vec<Arc<E>>>>,
}

impl<E: Entity> Stream for EntityWatchStream<E> {
    type Item = Arc<Vec<Arc<E>>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Arc<Vec<Arc<E>>> is Unpin, so WatchStream is too.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::model::{ConnectorId, Device, DeviceId, FirmwareInfo, HardwareInfo};
    use crate::repository::{CreateDeviceRequest, Repository};
    use crate::store::DataStore;

    fn announce(store: &DataStore, identifier: &str) -> DeviceId {
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
        .id
    }

    #[tokio::test]
    async fn changed_yields_new_snapshot() {
        let store = DataStore::new();
        let mut stream = store.subscribe_devices();
        assert!(stream.current().is_empty());

        let id = announce(&store, "sensor");

        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(stream.get(id).unwrap().identifier, "sensor");
        assert_eq!(stream.children_of(()).len(), 1);
    }

    #[test]
    fn latest_sees_writes_after_creation() {
        let store = DataStore::new();
        let stream = store.subscribe_devices();
        announce(&store, "sensor");

        assert!(stream.current().is_empty());
        assert_eq!(stream.latest().len(), 1);
    }
}
