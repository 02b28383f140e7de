//! In-memory adapters for the lifecycle ports.

mod events;
mod store;

pub use events::InMemoryEventLog;
pub use store::InMemoryLifecycleStore;
