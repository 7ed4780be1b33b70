// ── Reference persistence ──
//
// In-memory entity and state storage with push-based change notification.

mod collection;
mod data_store;
mod state_store;

pub use data_store::DataStore;
pub use state_store::StateStore;
