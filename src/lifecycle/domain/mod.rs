//! Domain model for task status propagation.
//!
//! Tasks are the single source of truth for execution state. Builds,
//! versions and patches aggregate that state and change only through
//! field-level updates, so concurrent writers never overwrite each other's
//! whole entity.

mod build;
mod config;
mod error;
mod event;
mod ids;
mod makespan;
mod project;
mod query;
mod status;
mod tally;
mod task;
mod version;

pub use build::{Build, BuildUpdate, CachedTask, CachedTaskUpdate, Makespans};
pub use config::LifecycleConfig;
pub use error::{LifecycleDomainError, ParseStatusError};
pub use event::{TaskEvent, TaskEventKind};
pub use ids::{ActorId, BuildId, DistroId, HostId, ProjectId, TaskId, VersionId};
pub use makespan::{actual_makespan, predicted_makespan};
pub use project::{ProjectSettings, ProjectTaskSettings, VariantSettings};
pub use query::{HistoryQuery, HistoryScope, TaskQuery};
pub use status::{BuildStatus, FinishStatus, Requester, TaskStatus, VersionStatus};
pub use tally::{BuildResolution, BuildTally};
pub use task::{Activation, ArchivedTask, FinishDetail, Task};
pub use version::{Patch, Progress, ProgressUpdate, Version};
