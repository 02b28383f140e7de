//! Task entity and its lifecycle mutations.

use super::{
    ActorId, BuildId, DistroId, FinishStatus, HostId, ProjectId, Requester, TaskId, TaskStatus,
    VersionId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal result reported by an execution agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishDetail {
    status: FinishStatus,
    description: String,
    timed_out: bool,
    diagnostics: serde_json::Value,
}

impl FinishDetail {
    /// Creates a detail carrying only the terminal status.
    #[must_use]
    pub const fn new(status: FinishStatus) -> Self {
        Self {
            status,
            description: String::new(),
            timed_out: false,
            diagnostics: serde_json::Value::Null,
        }
    }

    /// Shorthand for a passing result.
    #[must_use]
    pub const fn succeeded() -> Self {
        Self::new(FinishStatus::Succeeded)
    }

    /// Shorthand for a failing result.
    #[must_use]
    pub const fn failed() -> Self {
        Self::new(FinishStatus::Failed)
    }

    /// Sets a human-readable description of the result.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the execution as having timed out.
    #[must_use]
    pub const fn with_timed_out(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }

    /// Attaches an arbitrary diagnostic payload.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: serde_json::Value) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the terminal status.
    #[must_use]
    pub const fn status(&self) -> FinishStatus {
        self.status
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether the execution timed out.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Returns the diagnostic payload.
    #[must_use]
    pub const fn diagnostics(&self) -> &serde_json::Value {
        &self.diagnostics
    }
}

/// Activation state of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    /// Whether the task may be dispatched.
    pub active: bool,
    /// Actor responsible for the current activation state.
    pub activated_by: ActorId,
    /// When the task was last activated.
    pub activated_at: Option<DateTime<Utc>>,
}

/// A unit of work within a build.
///
/// The task is the single source of truth for its own status; build caches
/// only mirror it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    build_id: BuildId,
    version_id: VersionId,
    project: ProjectId,
    display_name: String,
    build_variant: String,
    revision_order: u64,
    requester: Requester,
    status: TaskStatus,
    activation: Activation,
    aborted: bool,
    priority: i64,
    execution: u32,
    host_id: Option<HostId>,
    distro_id: Option<DistroId>,
    dispatch_time: Option<DateTime<Utc>>,
    start_time: Option<DateTime<Utc>>,
    finish_time: Option<DateTime<Utc>>,
    time_taken: Duration,
    details: Option<FinishDetail>,
    depends_on: Vec<TaskId>,
}

impl Task {
    /// Creates an inactive, undispatched mainline task.
    #[must_use]
    pub fn new(
        build_id: BuildId,
        version_id: VersionId,
        project: ProjectId,
        build_variant: impl Into<String>,
        display_name: impl Into<String>,
        revision_order: u64,
    ) -> Self {
        Self {
            id: TaskId::new(),
            build_id,
            version_id,
            project,
            display_name: display_name.into(),
            build_variant: build_variant.into(),
            revision_order,
            requester: Requester::Mainline,
            status: TaskStatus::Undispatched,
            activation: Activation {
                active: false,
                activated_by: ActorId::new(""),
                activated_at: None,
            },
            aborted: false,
            priority: 0,
            execution: 0,
            host_id: None,
            distro_id: None,
            dispatch_time: None,
            start_time: None,
            finish_time: None,
            time_taken: Duration::ZERO,
            details: None,
            depends_on: Vec::new(),
        }
    }

    /// Overrides the generated identifier.
    #[must_use]
    pub const fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    /// Sets the requester kind.
    #[must_use]
    pub const fn with_requester(mut self, requester: Requester) -> Self {
        self.requester = requester;
        self
    }

    /// Sets the current status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the activation state.
    #[must_use]
    pub fn with_activation(mut self, active: bool, activated_by: impl Into<ActorId>) -> Self {
        self.activation.active = active;
        self.activation.activated_by = activated_by.into();
        self
    }

    /// Sets the scheduling priority; negative values disable the task.
    #[must_use]
    pub const fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the execution counter.
    #[must_use]
    pub const fn with_execution(mut self, execution: u32) -> Self {
        self.execution = execution;
        self
    }

    /// Records a prior dispatch time.
    #[must_use]
    pub const fn with_dispatch_time(mut self, dispatch_time: DateTime<Utc>) -> Self {
        self.dispatch_time = Some(dispatch_time);
        self
    }

    /// Records a start time.
    #[must_use]
    pub const fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Records a finish time.
    #[must_use]
    pub const fn with_finish_time(mut self, finish_time: DateTime<Utc>) -> Self {
        self.finish_time = Some(finish_time);
        self
    }

    /// Sets the elapsed execution time.
    #[must_use]
    pub const fn with_time_taken(mut self, time_taken: Duration) -> Self {
        self.time_taken = time_taken;
        self
    }

    /// Sets the tasks this task depends on.
    #[must_use]
    pub fn with_depends_on(mut self, depends_on: impl IntoIterator<Item = TaskId>) -> Self {
        self.depends_on = depends_on.into_iter().collect();
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning build.
    #[must_use]
    pub const fn build_id(&self) -> BuildId {
        self.build_id
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

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the build variant.
    #[must_use]
    pub fn build_variant(&self) -> &str {
        &self.build_variant
    }

    /// Returns the position of the task's revision in project history.
    #[must_use]
    pub const fn revision_order(&self) -> u64 {
        self.revision_order
    }

    /// Returns the requester kind.
    #[must_use]
    pub const fn requester(&self) -> Requester {
        self.requester
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns `true` once the task has a terminal result.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Returns `true` while an execution is in flight.
    #[must_use]
    pub const fn is_abortable(&self) -> bool {
        self.status.is_abortable()
    }

    /// Returns `true` when the task has been disabled via a negative priority.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.priority < 0
    }

    /// Returns the activation state.
    #[must_use]
    pub const fn activation(&self) -> &Activation {
        &self.activation
    }

    /// Returns whether the task is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.activation.active
    }

    /// Returns the actor responsible for the activation state.
    #[must_use]
    pub const fn activated_by(&self) -> &ActorId {
        &self.activation.activated_by
    }

    /// Returns whether an abort has been requested.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> i64 {
        self.priority
    }

    /// Returns how many times the task has been reset.
    #[must_use]
    pub const fn execution(&self) -> u32 {
        self.execution
    }

    /// Returns the host the task was dispatched to.
    #[must_use]
    pub const fn host_id(&self) -> Option<&HostId> {
        self.host_id.as_ref()
    }

    /// Returns the distro of the dispatch host.
    #[must_use]
    pub const fn distro_id(&self) -> Option<&DistroId> {
        self.distro_id.as_ref()
    }

    /// Returns the dispatch time.
    #[must_use]
    pub const fn dispatch_time(&self) -> Option<DateTime<Utc>> {
        self.dispatch_time
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

    /// Returns the elapsed execution time.
    #[must_use]
    pub const fn time_taken(&self) -> Duration {
        self.time_taken
    }

    /// Returns the finish detail of the latest execution, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&FinishDetail> {
        self.details.as_ref()
    }

    /// Returns the dependency task identifiers.
    #[must_use]
    pub fn depends_on(&self) -> &[TaskId] {
        &self.depends_on
    }

    /// A dispatched execution returned to the queue needs a full reset
    /// before it may run again.
    #[must_use]
    pub const fn needs_reset_on_activation(&self) -> bool {
        self.dispatch_time.is_some() && matches!(self.status, TaskStatus::Undispatched)
    }

    /// Activates the task on behalf of `caller`.
    pub fn activate(&mut self, caller: &ActorId, at: DateTime<Utc>) {
        self.activation.active = true;
        self.activation.activated_by = caller.clone();
        self.activation.activated_at = Some(at);
    }

    /// Deactivates the task on behalf of `caller`.
    pub fn deactivate(&mut self, caller: &ActorId) {
        self.activation.active = false;
        self.activation.activated_by = caller.clone();
    }

    /// Records a dispatch to `host`.
    pub fn mark_dispatched(&mut self, host: HostId, distro: DistroId, at: DateTime<Utc>) {
        self.status = TaskStatus::Dispatched;
        self.host_id = Some(host);
        self.distro_id = Some(distro);
        self.dispatch_time = Some(at);
        self.start_time = None;
        self.finish_time = None;
    }

    /// Returns the task to the queue after a dispatch fell through.
    ///
    /// The dispatch time is kept so a later activation resets the task.
    pub fn mark_undispatched(&mut self) {
        self.status = TaskStatus::Undispatched;
        self.host_id = None;
        self.distro_id = None;
        self.start_time = None;
        self.finish_time = None;
    }

    /// Records the start of execution.
    pub fn mark_started(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Started;
        self.start_time = Some(at);
    }

    /// Finalizes the current execution with `detail`.
    pub fn mark_end(&mut self, at: DateTime<Utc>, detail: FinishDetail) {
        let start = self.start_time.unwrap_or(at);
        self.time_taken = (at - start).to_std().unwrap_or(Duration::ZERO);
        self.start_time = Some(start);
        self.finish_time = Some(at);
        self.status = detail.status().task_status();
        self.details = Some(detail);
    }

    /// Records an abort request against the in-flight execution.
    pub const fn set_aborted(&mut self) {
        self.aborted = true;
    }

    /// Prepares the task for a fresh execution.
    pub fn reset(&mut self, at: DateTime<Utc>) {
        self.execution = self.execution.saturating_add(1);
        self.status = TaskStatus::Undispatched;
        self.activation.active = true;
        self.activation.activated_at = Some(at);
        self.aborted = false;
        self.host_id = None;
        self.distro_id = None;
        self.dispatch_time = None;
        self.start_time = None;
        self.finish_time = None;
        self.time_taken = Duration::ZERO;
        self.details = None;
    }
}

/// Historical snapshot of a task execution taken before a reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedTask {
    task: Task,
    archived_at: DateTime<Utc>,
}

impl ArchivedTask {
    /// Captures `task` as it stands at `archived_at`.
    #[must_use]
    pub fn capture(task: &Task, archived_at: DateTime<Utc>) -> Self {
        Self {
            task: task.clone(),
            archived_at,
        }
    }

    /// Returns the snapshot.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the execution number of the snapshot.
    #[must_use]
    pub const fn execution(&self) -> u32 {
        self.task.execution
    }

    /// Returns when the snapshot was taken.
    #[must_use]
    pub const fn archived_at(&self) -> DateTime<Utc> {
        self.archived_at
    }
}
