//! Dispatch bookkeeping and execution start.

use super::{LifecycleError, LifecycleResult, TaskLifecycleService};
use crate::lifecycle::{
    domain::{
        BuildUpdate, CachedTaskUpdate, DistroId, HostId, ProgressUpdate, Task, TaskEventKind,
        TaskId, TaskStatus, VersionId,
    },
    ports::{EventRecorder, LifecycleStore, StoreError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::debug;

impl<S, E, C> TaskLifecycleService<S, E, C>
where
    S: LifecycleStore,
    E: EventRecorder,
    C: Clock + Send + Sync,
{
    /// Assigns `task` to a host and persists the transition.
    ///
    /// The caller's copy is updated in place.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Dispatch`] wrapping the store failure.
    pub async fn mark_task_dispatched(
        &self,
        task: &mut Task,
        host_id: HostId,
        distro_id: DistroId,
    ) -> LifecycleResult<()> {
        let task_id = task.id();
        task.mark_dispatched(host_id.clone(), distro_id, self.now());
        self.persist_dispatch_transition(task)
            .await
            .map_err(|source| LifecycleError::dispatch(task_id, Some(host_id.clone()), source))?;
        self.record(task_id, TaskEventKind::Dispatched { host_id }, None)
            .await;
        Ok(())
    }

    /// Returns a dispatched `task` to the queue.
    ///
    /// The dispatch time is kept, so a later activation resets the task.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Dispatch`] wrapping the store failure.
    pub async fn mark_task_undispatched(&self, task: &mut Task) -> LifecycleResult<()> {
        let task_id = task.id();
        let host_id = task.host_id().cloned();
        task.mark_undispatched();
        self.persist_dispatch_transition(task)
            .await
            .map_err(|source| LifecycleError::dispatch(task_id, host_id.clone(), source))?;
        self.record(task_id, TaskEventKind::Undispatched { host_id }, None)
            .await;
        Ok(())
    }

    async fn persist_dispatch_transition(&self, task: &Task) -> LifecycleResult<()> {
        self.store.update_task(task).await?;
        let update = if task.status() == TaskStatus::Dispatched {
            CachedTaskUpdate::Dispatched
        } else {
            CachedTaskUpdate::Undispatched
        };
        self.update_cached_task(task.build_id(), task.id(), update)
            .await
    }

    /// Records the start of execution and starts the build, version, and
    /// patch if they have not started yet.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for unknown tasks or a
    /// store error.
    pub async fn mark_start(&self, task_id: TaskId) -> LifecycleResult<()> {
        let mut task = self.load_task(task_id).await?;
        let start_time = self.now();
        task.mark_started(start_time);
        self.store.update_task(&task).await?;
        self.record(task_id, TaskEventKind::Started, None).await;

        self.store
            .update_build(task.build_id(), BuildUpdate::TryStart(start_time))
            .await?;
        self.store
            .update_version(task.version_id(), ProgressUpdate::TryStart(start_time))
            .await?;
        if task.requester().is_patch() {
            self.try_start_patch(task.version_id(), start_time).await?;
        }

        self.update_cached_task(
            task.build_id(),
            task_id,
            CachedTaskUpdate::Started(start_time),
        )
        .await
    }

    async fn try_start_patch(
        &self,
        version_id: VersionId,
        start_time: DateTime<Utc>,
    ) -> LifecycleResult<()> {
        match self
            .store
            .update_patch(version_id, ProgressUpdate::TryStart(start_time))
            .await
        {
            Ok(_) => Ok(()),
            Err(StoreError::PatchNotFound(_)) => {
                debug!(version_id = %version_id, "no patch to start");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
