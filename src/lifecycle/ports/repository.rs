//! Store ports for tasks, builds, versions and patches.

use crate::lifecycle::domain::{
    ArchivedTask, Build, BuildId, BuildUpdate, LifecycleDomainError, Patch, ProgressUpdate, Task,
    TaskId, TaskQuery, TaskStatus, Version, VersionId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateTask`] when the identifier exists.
    async fn store_task(&self, task: &Task) -> StoreResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task does not exist.
    async fn update_task(&self, task: &Task) -> StoreResult<()>;

    /// Persists a finished task only if the stored status still equals
    /// `expected`, returning whether the write happened.
    ///
    /// Concurrent completion signals for the same execution race here; at
    /// most one of them observes `true`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task does not exist.
    async fn finish_task(&self, task: &Task, expected: TaskStatus) -> StoreResult<bool>;

    /// Saves a historical snapshot of the task's current execution.
    async fn archive_task(&self, snapshot: ArchivedTask) -> StoreResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Returns all tasks matching `query`.
    ///
    /// History queries return newest revisions first and honour the limit.
    async fn find_tasks(&self, query: &TaskQuery) -> StoreResult<Vec<Task>>;

    /// Returns archived executions of a task, oldest first.
    async fn find_archived(&self, id: TaskId) -> StoreResult<Vec<ArchivedTask>>;
}

/// Build persistence contract.
#[async_trait]
pub trait BuildRepository: Send + Sync {
    /// Stores a new build.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateBuild`] when the identifier exists.
    async fn store_build(&self, build: &Build) -> StoreResult<()>;

    /// Finds a build by identifier.
    async fn find_build(&self, id: BuildId) -> StoreResult<Option<Build>>;

    /// Returns every build of a version.
    async fn find_builds_by_version(&self, version_id: VersionId) -> StoreResult<Vec<Build>>;

    /// Atomically applies a field-level update, returning whether it changed
    /// the stored build.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BuildNotFound`] when the build does not exist or
    /// [`StoreError::Domain`] when the update is rejected.
    async fn update_build(&self, id: BuildId, update: BuildUpdate) -> StoreResult<bool>;
}

/// Version persistence contract.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Stores a new version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateVersion`] when the identifier exists.
    async fn store_version(&self, version: &Version) -> StoreResult<()>;

    /// Finds a version by identifier.
    async fn find_version(&self, id: VersionId) -> StoreResult<Option<Version>>;

    /// Atomically applies a progress update, returning whether it changed
    /// the stored version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionNotFound`] when the version does not
    /// exist.
    async fn update_version(&self, id: VersionId, update: ProgressUpdate) -> StoreResult<bool>;
}

/// Patch persistence contract. Patches are keyed by their version.
#[async_trait]
pub trait PatchRepository: Send + Sync {
    /// Stores a new patch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicatePatch`] when the version already has a
    /// patch.
    async fn store_patch(&self, patch: &Patch) -> StoreResult<()>;

    /// Finds the patch wrapping a version.
    async fn find_patch(&self, version_id: VersionId) -> StoreResult<Option<Patch>>;

    /// Atomically applies a progress update, returning whether it changed
    /// the stored patch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PatchNotFound`] when no patch wraps the version.
    async fn update_patch(&self, version_id: VersionId, update: ProgressUpdate)
    -> StoreResult<bool>;
}

/// Everything the lifecycle service needs from persistence.
pub trait LifecycleStore:
    TaskRepository + BuildRepository + VersionRepository + PatchRepository
{
}

impl<T> LifecycleStore for T where
    T: TaskRepository + BuildRepository + VersionRepository + PatchRepository
{
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A build with the same identifier already exists.
    #[error("duplicate build identifier: {0}")]
    DuplicateBuild(BuildId),

    /// A version with the same identifier already exists.
    #[error("duplicate version identifier: {0}")]
    DuplicateVersion(VersionId),

    /// The version already has a patch.
    #[error("duplicate patch for version: {0}")]
    DuplicatePatch(VersionId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The build was not found.
    #[error("build not found: {0}")]
    BuildNotFound(BuildId),

    /// The version was not found.
    #[error("version not found: {0}")]
    VersionNotFound(VersionId),

    /// No patch wraps the version.
    #[error("patch not found for version: {0}")]
    PatchNotFound(VersionId),

    /// The update was rejected by a domain invariant.
    #[error(transparent)]
    Domain(#[from] LifecycleDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
