// ── Synchronous event dispatcher ──
//
// Listeners register per event kind and run on the publishing thread, in
// registration order. No queue, no background worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, trace};

use super::{ConnectorEvent, EventKind};
use crate::error::CoreError;

/// Receives every event of the kinds it was registered for.
pub trait Listener: Send + Sync {
    fn handle(&self, event: &ConnectorEvent) -> Result<(), CoreError>;
}

impl<F> Listener for F
where
    F: Fn(&ConnectorEvent) -> Result<(), CoreError> + Send + Sync,
{
    fn handle(&self, event: &ConnectorEvent) -> Result<(), CoreError> {
        self(event)
    }
}

/// Names one (kind, listener) registration. Removing it removes exactly
/// that pair, even if the same listener is registered elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    kind: EventKind,
    id: u64,
}

impl ListenerHandle {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

type Registration = (u64, Arc<dyn Listener>);

#[derive(Default)]
pub struct EventDispatcher {
    listeners: DashMap<EventKind, Vec<Registration>>,
    next_id: AtomicU64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, kind: EventKind, listener: Arc<dyn Listener>) -> ListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.entry(kind).or_default().push((id, listener));
        debug!(%kind, id, "listener registered");
        ListenerHandle { kind, id }
    }

    /// Unregister one listener. Returns `false` if the handle was already
    /// removed.
    pub fn remove_listener(&self, handle: ListenerHandle) -> bool {
        let Some(mut registrations) = self.listeners.get_mut(&handle.kind) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|(id, _)| *id != handle.id);
        let removed = registrations.len() != before;
        drop(registrations);

        if removed {
            debug!(kind = %handle.kind, id = handle.id, "listener removed");
        }
        removed
    }

    /// Invoke every listener registered for the event's kind.
    ///
    /// The listener table is released before the first call, so a listener
    /// may publish further events. The first listener error stops the
    /// fan-out and is returned.
    pub fn fire(&self, event: &ConnectorEvent) -> Result<(), CoreError> {
        let kind = event.kind();
        let listeners: Vec<Arc<dyn Listener>> = self
            .listeners
            .get(&kind)
            .map(|r| r.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        trace!(%kind, listeners = listeners.len(), "firing event");
        for listener in listeners {
            listener.handle(event)?;
        }
        Ok(())
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, |r| r.len())
    }

    /// Total registrations across every kind.
    pub fn len(&self) -> usize {
        self.listeners.iter().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
