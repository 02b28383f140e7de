//! Build entity, its cached task summary, and field-level build updates.

use super::{
    BuildId, BuildStatus, LifecycleDomainError, ProjectId, Requester, Task, TaskId, TaskStatus,
    VersionId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Denormalized per-task summary stored on a build for fast listing.
///
/// This is a shadow of the authoritative [`Task`] and may be transiently
/// stale; every write path touching a task reconciles its entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTask {
    /// Mirrored task identifier.
    pub id: TaskId,
    /// Mirrored display name.
    pub display_name: String,
    /// Mirrored status.
    pub status: TaskStatus,
    /// Mirrored activation flag.
    pub activated: bool,
    /// Mirrored start time.
    pub start_time: Option<DateTime<Utc>>,
    /// Mirrored elapsed time.
    pub time_taken: Duration,
}

impl CachedTask {
    /// Builds a summary entry from the authoritative task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id(),
            display_name: task.display_name().to_owned(),
            status: task.status(),
            activated: task.is_active(),
            start_time: task.start_time(),
            time_taken: task.time_taken(),
        }
    }

    fn apply(&mut self, update: CachedTaskUpdate) {
        match update {
            CachedTaskUpdate::Activated(activated) => self.activated = activated,
            CachedTaskUpdate::Dispatched => self.status = TaskStatus::Dispatched,
            CachedTaskUpdate::Undispatched => self.status = TaskStatus::Undispatched,
            CachedTaskUpdate::Started(at) => {
                self.status = TaskStatus::Started;
                self.start_time = Some(at);
            }
            CachedTaskUpdate::Finished { status, time_taken } => {
                self.status = status;
                self.time_taken = time_taken;
            }
            CachedTaskUpdate::Reset => {
                self.status = TaskStatus::Undispatched;
                self.activated = true;
                self.start_time = None;
                self.time_taken = Duration::ZERO;
            }
        }
    }
}

/// Change applied to one cached task entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedTaskUpdate {
    /// Activation flag changed.
    Activated(bool),
    /// Task was dispatched.
    Dispatched,
    /// Task went back to the queue.
    Undispatched,
    /// Task started at the given time.
    Started(DateTime<Utc>),
    /// Task finished.
    Finished {
        /// Terminal task status.
        status: TaskStatus,
        /// Elapsed execution time.
        time_taken: Duration,
    },
    /// Task was reset for another execution.
    Reset,
}

/// Predicted and observed duration of a build's task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Makespans {
    /// Longest dependency path weighted by elapsed time.
    pub predicted: Duration,
    /// Wall-clock span from the earliest start to the latest finish.
    pub actual: Duration,
}

/// Field-level change to a build, applied atomically by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildUpdate {
    /// Overwrite the status, undoing any earlier finalization.
    ///
    /// Skipped when the finish time no longer equals `seen_finish`, so a
    /// recomputation from a stale read cannot reopen a build that was
    /// finalized after the read.
    Status {
        /// New status.
        status: BuildStatus,
        /// Finish time observed when the status was computed.
        seen_finish: Option<DateTime<Utc>>,
    },
    /// Finalize with a terminal status and finish time.
    Finish {
        /// Terminal status.
        status: BuildStatus,
        /// Finish time.
        at: DateTime<Utc>,
    },
    /// Mark started unless the build has already left `Created`.
    TryStart(DateTime<Utc>),
    /// Persist makespan statistics.
    Makespans(Makespans),
    /// Update one cached task summary entry.
    CachedTask {
        /// Task whose entry changes.
        task_id: TaskId,
        /// The change.
        update: CachedTaskUpdate,
    },
}

/// A named group of tasks sharing a build variant within one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    id: BuildId,
    version_id: VersionId,
    project: ProjectId,
    build_variant: String,
    requester: Requester,
    status: BuildStatus,
    start_time: Option<DateTime<Utc>>,
    finish_time: Option<DateTime<Utc>>,
    time_taken: Duration,
    tasks: Vec<CachedTask>,
    makespans: Makespans,
}

impl Build {
    /// Creates an empty mainline build in the `Created` state.
    #[must_use]
    pub fn new(version_id: VersionId, project: ProjectId, build_variant: impl Into<String>) -> Self {
        Self {
            id: BuildId::new(),
            version_id,
            project,
            build_variant: build_variant.into(),
            requester: Requester::Mainline,
            status: BuildStatus::Created,
            start_time: None,
            finish_time: None,
            time_taken: Duration::ZERO,
            tasks: Vec::new(),
            makespans: Makespans::default(),
        }
    }

    /// Overrides the generated identifier.
    #[must_use]
    pub const fn with_id(mut self, id: BuildId) -> Self {
        self.id = id;
        self
    }

    /// Sets the requester kind.
    #[must_use]
    pub const fn with_requester(mut self, requester: Requester) -> Self {
        self.requester = requester;
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: BuildStatus) -> Self {
        self.status = status;
        self
    }

    /// Seeds the cached summary from the given tasks.
    #[must_use]
    pub fn with_tasks<'a>(mut self, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        self.tasks = tasks.into_iter().map(CachedTask::from_task).collect();
        self
    }

    /// Returns the build identifier.
    #[must_use]
    pub const fn id(&self) -> BuildId {
        self.id
    }

    /// Returns the owning version.
    #[must_use]
    pub const fn version_id(&self) -> VersionId {
        self.version_id
    }

    /// Returns the project.
    #[must_use]
    pub const fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Returns the build variant.
    #[must_use]
    pub fn build_variant(&self) -> &str {
        &self.build_variant
    }

    /// Returns the requester kind.
    #[must_use]
    pub const fn requester(&self) -> Requester {
        self.requester
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> BuildStatus {
        self.status
    }

    /// Returns `true` once the build has been finalized.
    ///
    /// A terminal status alone is not enough: an unresolved build with a
    /// failed task already reports `failed` while siblings keep running.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.status.is_finished() && self.finish_time.is_some()
    }

    /// Returns the start time.
    #[must_use]
    pub const fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Returns the finish time.
    #[must_use]
    pub const fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.finish_time
    }

    /// Returns the elapsed time between start and finalization.
    #[must_use]
    pub const fn time_taken(&self) -> Duration {
        self.time_taken
    }

    /// Returns the cached task summary.
    #[must_use]
    pub fn tasks(&self) -> &[CachedTask] {
        &self.tasks
    }

    /// Returns the cached entry for `task_id`.
    #[must_use]
    pub fn cached_task(&self, task_id: TaskId) -> Option<&CachedTask> {
        self.tasks.iter().find(|cached| cached.id == task_id)
    }

    /// Returns the makespan statistics.
    #[must_use]
    pub const fn makespans(&self) -> Makespans {
        self.makespans
    }

    /// Applies a field-level update, returning whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::CachedTaskNotFound`] when a cached
    /// entry update addresses a task the build does not list.
    pub fn apply(&mut self, update: BuildUpdate) -> Result<bool, LifecycleDomainError> {
        match update {
            BuildUpdate::Status {
                status,
                seen_finish,
            } => Ok(self.set_status(status, seen_finish)),
            BuildUpdate::Finish { status, at } => Ok(self.finish(status, at)),
            BuildUpdate::TryStart(at) => Ok(self.try_start(at)),
            BuildUpdate::Makespans(makespans) => {
                let changed = self.makespans != makespans;
                self.makespans = makespans;
                Ok(changed)
            }
            BuildUpdate::CachedTask { task_id, update } => {
                let build_id = self.id;
                let entry = self
                    .tasks
                    .iter_mut()
                    .find(|cached| cached.id == task_id)
                    .ok_or(LifecycleDomainError::CachedTaskNotFound { build_id, task_id })?;
                let before = entry.clone();
                entry.apply(update);
                Ok(*entry != before)
            }
        }
    }

    /// Status writes never finalize, so any earlier finalization is undone.
    fn set_status(&mut self, status: BuildStatus, seen_finish: Option<DateTime<Utc>>) -> bool {
        if self.finish_time != seen_finish {
            return false;
        }
        let reopened = self.finish_time.take().is_some();
        if reopened {
            self.time_taken = Duration::ZERO;
        }
        if self.status == status {
            return reopened;
        }
        self.status = status;
        true
    }

    fn finish(&mut self, status: BuildStatus, at: DateTime<Utc>) -> bool {
        if self.status == status && self.finish_time.is_some() {
            return false;
        }
        let start = self.start_time.unwrap_or(at);
        self.status = status;
        self.finish_time = Some(at);
        self.time_taken = (at - start).to_std().unwrap_or(Duration::ZERO);
        true
    }

    fn try_start(&mut self, at: DateTime<Utc>) -> bool {
        if self.status != BuildStatus::Created {
            return false;
        }
        self.status = BuildStatus::Started;
        self.start_time = Some(at);
        true
    }
}
