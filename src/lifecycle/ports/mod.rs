//! Port contracts for the lifecycle engine.
//!
//! Ports define infrastructure-agnostic interfaces used by the lifecycle
//! service: the status store and the audit event recorder.

pub mod events;
pub mod repository;

pub use events::{EventRecorder, EventRecorderError, EventRecorderResult};
pub use repository::{
    BuildRepository, LifecycleStore, PatchRepository, StoreError, StoreResult, TaskRepository,
    VersionRepository,
};
