//! Shared helpers for in-memory lifecycle integration tests.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use rstest::fixture;
use stepback::lifecycle::{
    adapters::memory::{InMemoryEventLog, InMemoryLifecycleStore},
    domain::{
        Build, BuildId, FinishDetail, LifecycleConfig, Patch, ProjectId, ProjectSettings,
        Requester, Task, TaskId, TaskStatus, Version, VersionId,
    },
    ports::{BuildRepository, PatchRepository, TaskRepository, VersionRepository},
    services::{LifecycleResult, MarkEndRequest, TaskLifecycleService},
};
use tokio::task::JoinHandle;

/// Project every seeded entity belongs to.
pub const PROJECT: &str = "mci";

/// Service type used by the integration tests.
pub type TestService = TaskLifecycleService<InMemoryLifecycleStore, InMemoryEventLog, DefaultClock>;

/// Lifecycle service together with the adapters it writes to.
pub struct Lifecycle {
    pub store: Arc<InMemoryLifecycleStore>,
    pub events: Arc<InMemoryEventLog>,
    pub service: Arc<TestService>,
}

impl Lifecycle {
    /// Wires a service to fresh in-memory adapters.
    #[must_use]
    pub fn new(config: LifecycleConfig) -> Self {
        let store = Arc::new(InMemoryLifecycleStore::new());
        let events = Arc::new(InMemoryEventLog::new());
        let service = Arc::new(TaskLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&events),
            Arc::new(DefaultClock),
            config,
        ));
        Self {
            store,
            events,
            service,
        }
    }

    /// Runs `mark_end` on its own Tokio task so callers can race finishes.
    pub fn spawn_finish(
        &self,
        request: MarkEndRequest,
        settings: ProjectSettings,
    ) -> JoinHandle<LifecycleResult<()>> {
        let service = Arc::clone(&self.service);
        tokio::spawn(async move { service.mark_end(request, &settings).await })
    }

    /// Stores a version, plus its patch when `requester` is a patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects either document.
    pub async fn seed_version(&self, requester: Requester) -> Result<VersionId, eyre::Report> {
        let version = Version::new(ProjectId::new(PROJECT)).with_requester(requester);
        self.store.store_version(&version).await?;
        if requester.is_patch() {
            self.store
                .store_patch(&Patch::new(version.id(), "alice"))
                .await?;
        }
        Ok(version.id())
    }

    /// Stores a build of `variant` at `revision` whose tasks are all running.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the build or a task.
    pub async fn seed_running_build(
        &self,
        version_id: VersionId,
        variant: &str,
        revision: u64,
        names: &[&str],
    ) -> Result<(BuildId, Vec<TaskId>), eyre::Report> {
        self.seed_build(version_id, variant, revision, names, true)
            .await
    }

    /// Stores a build whose tasks are inactive and still in the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the build or a task.
    pub async fn seed_queued_build(
        &self,
        version_id: VersionId,
        variant: &str,
        revision: u64,
        names: &[&str],
    ) -> Result<(BuildId, Vec<TaskId>), eyre::Report> {
        self.seed_build(version_id, variant, revision, names, false)
            .await
    }

    async fn seed_build(
        &self,
        version_id: VersionId,
        variant: &str,
        revision: u64,
        names: &[&str],
        running: bool,
    ) -> Result<(BuildId, Vec<TaskId>), eyre::Report> {
        let version = self
            .store
            .find_version(version_id)
            .await?
            .ok_or_else(|| eyre::eyre!("version {version_id} was not seeded"))?;
        let build_id = BuildId::new();
        let started = Utc::now() - chrono::Duration::seconds(30);
        let tasks: Vec<Task> = names
            .iter()
            .map(|name| {
                let queued = Task::new(
                    build_id,
                    version_id,
                    ProjectId::new(PROJECT),
                    variant,
                    *name,
                    revision,
                )
                .with_requester(version.requester());
                if running {
                    queued
                        .with_activation(true, "scheduler")
                        .with_status(TaskStatus::Started)
                        .with_start_time(started)
                } else {
                    queued
                }
            })
            .collect();
        let build = Build::new(version_id, ProjectId::new(PROJECT), variant)
            .with_id(build_id)
            .with_requester(version.requester())
            .with_tasks(&tasks);
        self.store.store_build(&build).await?;
        for task in &tasks {
            self.store.store_task(task).await?;
        }
        Ok((build_id, tasks.iter().map(Task::id).collect()))
    }

    /// Loads a task that must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or the task is missing.
    pub async fn task(&self, id: TaskId) -> Result<Task, eyre::Report> {
        self.store
            .find_task(id)
            .await?
            .ok_or_else(|| eyre::eyre!("task {id} not found"))
    }

    /// Counts the archived executions of a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive lookup fails.
    pub async fn archived_executions(&self, id: TaskId) -> Result<usize, eyre::Report> {
        Ok(self.store.find_archived(id).await?.len())
    }

    /// Loads a build that must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or the build is missing.
    pub async fn build(&self, id: BuildId) -> Result<Build, eyre::Report> {
        self.store
            .find_build(id)
            .await?
            .ok_or_else(|| eyre::eyre!("build {id} not found"))
    }

    /// Loads a version that must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or the version is missing.
    pub async fn version(&self, id: VersionId) -> Result<Version, eyre::Report> {
        self.store
            .find_version(id)
            .await?
            .ok_or_else(|| eyre::eyre!("version {id} not found"))
    }

    /// Loads a patch that must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or the patch is missing.
    pub async fn patch(&self, id: VersionId) -> Result<Patch, eyre::Report> {
        self.store
            .find_patch(id)
            .await?
            .ok_or_else(|| eyre::eyre!("patch for {id} not found"))
    }
}

/// Provides a lifecycle wired with the default engine policy.
#[fixture]
pub fn lifecycle() -> Lifecycle {
    Lifecycle::new(LifecycleConfig::default())
}

/// Project settings with the given stepback default.
#[must_use]
pub fn project(stepback: bool) -> ProjectSettings {
    ProjectSettings::new(ProjectId::new(PROJECT), stepback)
}

/// Finish request sent by an agent on `host-1`.
#[must_use]
pub fn agent_finish(task_id: TaskId, detail: FinishDetail) -> MarkEndRequest {
    MarkEndRequest::new(task_id, "host-1", Utc::now(), detail)
}
