//! Shared world state for build resolution BDD scenarios.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use mockable::DefaultClock;
use rstest::fixture;
use stepback::lifecycle::{
    adapters::memory::{InMemoryEventLog, InMemoryLifecycleStore},
    domain::{
        Build, BuildId, LifecycleConfig, Patch, ProjectId, ProjectSettings, Requester, Task,
        TaskId, TaskStatus, Version, VersionId,
    },
    ports::{BuildRepository, PatchRepository, TaskRepository, VersionRepository},
    services::{LifecycleResult, TaskLifecycleService},
};

/// Project every scenario entity belongs to.
pub const PROJECT: &str = "mci";

/// Build variant every scenario build runs on.
pub const VARIANT: &str = "linux";

/// Revision of the build under test. Earlier revisions seeded by a
/// scenario must stay below it.
pub const CURRENT_REVISION: u64 = 10;

/// Service type used by the BDD world.
pub type TestService = TaskLifecycleService<InMemoryLifecycleStore, InMemoryEventLog, DefaultClock>;

/// Scenario world for build resolution behaviour tests.
pub struct ResolutionWorld {
    pub store: Arc<InMemoryLifecycleStore>,
    pub service: TestService,
    pub settings: ProjectSettings,
    pub version_id: Option<VersionId>,
    pub build_id: Option<BuildId>,
    pub tasks: HashMap<String, TaskId>,
    pub history: HashMap<(u64, String), TaskId>,
    pub last_result: Option<LifecycleResult<()>>,
}

impl ResolutionWorld {
    /// Creates a world with the default engine policy and no seeded builds.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryLifecycleStore::new());
        let service = TaskLifecycleService::new(
            Arc::clone(&store),
            Arc::new(InMemoryEventLog::new()),
            Arc::new(DefaultClock),
            LifecycleConfig::default(),
        );

        Self {
            store,
            service,
            settings: ProjectSettings::new(ProjectId::new(PROJECT), false),
            version_id: None,
            build_id: None,
            tasks: HashMap::new(),
            history: HashMap::new(),
            last_result: None,
        }
    }

    /// Identifier of a task in the build under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no task of that name was seeded.
    pub fn task_id(&self, name: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("task {name:?} is not part of the scenario build"))
    }

    /// Identifier of a task seeded at an earlier revision.
    ///
    /// # Errors
    ///
    /// Returns an error when no such revision was seeded.
    pub fn history_id(&self, revision: u64, name: &str) -> Result<TaskId, eyre::Report> {
        self.history
            .get(&(revision, name.to_owned()))
            .copied()
            .ok_or_else(|| eyre::eyre!("revision {revision} of {name:?} was not seeded"))
    }

    /// Identifier of the build under test.
    ///
    /// # Errors
    ///
    /// Returns an error before a build has been seeded.
    pub fn build_id(&self) -> Result<BuildId, eyre::Report> {
        self.build_id
            .ok_or_else(|| eyre::eyre!("missing scenario build"))
    }

    /// Identifier of the version under test.
    ///
    /// # Errors
    ///
    /// Returns an error before a build has been seeded.
    pub fn version_id(&self) -> Result<VersionId, eyre::Report> {
        self.version_id
            .ok_or_else(|| eyre::eyre!("missing scenario version"))
    }

    /// Stores a version, its patch for patch requesters, a build and its
    /// tasks in one go, returning the stored tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects any document.
    pub async fn seed_build(
        &self,
        requester: Requester,
        revision: u64,
        tasks: impl Fn(BuildId, VersionId) -> Vec<Task>,
    ) -> Result<(VersionId, BuildId, Vec<Task>), eyre::Report> {
        let version = Version::new(ProjectId::new(PROJECT)).with_requester(requester);
        self.store.store_version(&version).await?;
        if requester.is_patch() {
            self.store
                .store_patch(&Patch::new(version.id(), "alice"))
                .await?;
        }
        let build_id = BuildId::new();
        let seeded: Vec<Task> = tasks(build_id, version.id())
            .into_iter()
            .map(|task| task.with_requester(requester))
            .collect();
        let build = Build::new(version.id(), ProjectId::new(PROJECT), VARIANT)
            .with_id(build_id)
            .with_requester(requester)
            .with_tasks(&seeded);
        self.store.store_build(&build).await?;
        for task in &seeded {
            self.store.store_task(task).await?;
        }
        Ok((version.id(), build_id, seeded))
    }

    /// Loads a task that must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails or the task is missing.
    pub async fn load_task(&self, id: TaskId) -> Result<Task, eyre::Report> {
        self.store
            .find_task(id)
            .await?
            .ok_or_else(|| eyre::eyre!("task {id} not found"))
    }
}

impl Default for ResolutionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// A task of the scenario build at `revision`.
#[must_use]
pub fn scenario_task(build_id: BuildId, version_id: VersionId, name: &str, revision: u64) -> Task {
    Task::new(
        build_id,
        version_id,
        ProjectId::new(PROJECT),
        VARIANT,
        name,
        revision,
    )
}

/// A scenario task that an agent is currently running.
#[must_use]
pub fn running_task(build_id: BuildId, version_id: VersionId, name: &str) -> Task {
    scenario_task(build_id, version_id, name, CURRENT_REVISION)
        .with_activation(true, "scheduler")
        .with_status(TaskStatus::Started)
        .with_start_time(Utc::now() - chrono::Duration::seconds(30))
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ResolutionWorld {
    ResolutionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
