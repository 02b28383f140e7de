//! In-memory status store for lifecycle tests and embedding applications.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::lifecycle::{
    domain::{
        ArchivedTask, Build, BuildId, BuildUpdate, Patch, ProgressUpdate, Task, TaskId, TaskQuery,
        TaskStatus, Version, VersionId,
    },
    ports::{
        BuildRepository, PatchRepository, StoreError, StoreResult, TaskRepository,
        VersionRepository,
    },
};

/// Thread-safe in-memory store holding every lifecycle entity.
///
/// All entities share one lock, so each field-level update is atomic with
/// respect to concurrent readers and writers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLifecycleStore {
    state: Arc<RwLock<InMemoryLifecycleState>>,
}

#[derive(Debug, Default)]
struct InMemoryLifecycleState {
    tasks: HashMap<TaskId, Task>,
    archived: HashMap<TaskId, Vec<ArchivedTask>>,
    builds: HashMap<BuildId, Build>,
    versions: HashMap<VersionId, Version>,
    patches: HashMap<VersionId, Patch>,
}

impl InMemoryLifecycleStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryLifecycleState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryLifecycleState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

/// Orders history matches newest first and applies the limit.
fn order_matches(query: &TaskQuery, mut tasks: Vec<Task>) -> Vec<Task> {
    match query {
        TaskQuery::ByBuild(_) => {
            tasks.sort_by(|left, right| left.display_name().cmp(right.display_name()));
            tasks
        }
        TaskQuery::History(history) => {
            tasks.sort_by_key(|task| std::cmp::Reverse(task.revision_order()));
            if let Some(limit) = history.limit() {
                tasks.truncate(limit);
            }
            tasks
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryLifecycleStore {
    async fn store_task(&self, task: &Task) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(StoreError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(StoreError::TaskNotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    async fn finish_task(&self, task: &Task, expected: TaskStatus) -> StoreResult<bool> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(StoreError::TaskNotFound(task.id()))?;
        if stored.status() != expected {
            return Ok(false);
        }
        *stored = task.clone();
        Ok(true)
    }

    async fn archive_task(&self, snapshot: ArchivedTask) -> StoreResult<()> {
        let mut state = self.write()?;
        let task_id = snapshot.task().id();
        if !state.tasks.contains_key(&task_id) {
            return Err(StoreError::TaskNotFound(task_id));
        }
        state.archived.entry(task_id).or_default().push(snapshot);
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_tasks(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        let matches = state
            .tasks
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect();
        Ok(order_matches(query, matches))
    }

    async fn find_archived(&self, id: TaskId) -> StoreResult<Vec<ArchivedTask>> {
        let state = self.read()?;
        Ok(state.archived.get(&id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl BuildRepository for InMemoryLifecycleStore {
    async fn store_build(&self, build: &Build) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.builds.contains_key(&build.id()) {
            return Err(StoreError::DuplicateBuild(build.id()));
        }
        state.builds.insert(build.id(), build.clone());
        Ok(())
    }

    async fn find_build(&self, id: BuildId) -> StoreResult<Option<Build>> {
        let state = self.read()?;
        Ok(state.builds.get(&id).cloned())
    }

    async fn find_builds_by_version(&self, version_id: VersionId) -> StoreResult<Vec<Build>> {
        let state = self.read()?;
        Ok(state
            .builds
            .values()
            .filter(|build| build.version_id() == version_id)
            .cloned()
            .collect())
    }

    async fn update_build(&self, id: BuildId, update: BuildUpdate) -> StoreResult<bool> {
        let mut state = self.write()?;
        let build = state
            .builds
            .get_mut(&id)
            .ok_or(StoreError::BuildNotFound(id))?;
        Ok(build.apply(update)?)
    }
}

#[async_trait]
impl VersionRepository for InMemoryLifecycleStore {
    async fn store_version(&self, version: &Version) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.versions.contains_key(&version.id()) {
            return Err(StoreError::DuplicateVersion(version.id()));
        }
        state.versions.insert(version.id(), version.clone());
        Ok(())
    }

    async fn find_version(&self, id: VersionId) -> StoreResult<Option<Version>> {
        let state = self.read()?;
        Ok(state.versions.get(&id).cloned())
    }

    async fn update_version(&self, id: VersionId, update: ProgressUpdate) -> StoreResult<bool> {
        let mut state = self.write()?;
        let version = state
            .versions
            .get_mut(&id)
            .ok_or(StoreError::VersionNotFound(id))?;
        Ok(version.apply(update))
    }
}

#[async_trait]
impl PatchRepository for InMemoryLifecycleStore {
    async fn store_patch(&self, patch: &Patch) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.patches.contains_key(&patch.version_id()) {
            return Err(StoreError::DuplicatePatch(patch.version_id()));
        }
        state.patches.insert(patch.version_id(), patch.clone());
        Ok(())
    }

    async fn find_patch(&self, version_id: VersionId) -> StoreResult<Option<Patch>> {
        let state = self.read()?;
        Ok(state.patches.get(&version_id).cloned())
    }

    async fn update_patch(
        &self,
        version_id: VersionId,
        update: ProgressUpdate,
    ) -> StoreResult<bool> {
        let mut state = self.write()?;
        let patch = state
            .patches
            .get_mut(&version_id)
            .ok_or(StoreError::PatchNotFound(version_id))?;
        Ok(patch.apply(update))
    }
}
