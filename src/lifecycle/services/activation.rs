//! Activation, deactivation, and abort.

use super::{LifecycleError, LifecycleResult, TaskLifecycleService};
use crate::lifecycle::{
    domain::{
        ActorId, CachedTaskUpdate, HistoryQuery, Requester, TaskEventKind, TaskId, TaskQuery,
        TaskStatus,
    },
    ports::{EventRecorder, LifecycleStore},
};
use mockable::Clock;
use std::{collections::HashSet, future::Future, pin::Pin};
use tracing::debug;

type ActivationFuture<'a> = Pin<Box<dyn Future<Output = LifecycleResult<()>> + Send + 'a>>;

impl<S, E, C> TaskLifecycleService<S, E, C>
where
    S: LifecycleStore,
    E: EventRecorder,
    C: Clock + Send + Sync,
{
    /// Activates or deactivates a task on behalf of `caller`.
    ///
    /// Activation first activates every transitive dependency. A task that
    /// was dispatched and then returned to the queue is fully reset instead
    /// of merely flagged active. A system actor cannot deactivate a task
    /// that a user activated; such a request succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for unknown tasks,
    /// [`LifecycleError::DependencyActivation`] when a dependency cannot be
    /// activated, or a store error.
    pub async fn set_active(
        &self,
        task_id: TaskId,
        caller: &ActorId,
        active: bool,
    ) -> LifecycleResult<()> {
        let mut visited = HashSet::new();
        self.set_active_walk(task_id, caller, active, &mut visited)
            .await
    }

    fn set_active_walk<'a>(
        &'a self,
        task_id: TaskId,
        caller: &'a ActorId,
        active: bool,
        visited: &'a mut HashSet<TaskId>,
    ) -> ActivationFuture<'a> {
        Box::pin(async move {
            visited.insert(task_id);
            let mut task = self.load_task(task_id).await?;

            if active {
                for dependency_id in task.depends_on().to_vec() {
                    if visited.contains(&dependency_id) {
                        continue;
                    }
                    self.set_active_walk(dependency_id, caller, true, visited)
                        .await
                        .map_err(|source| {
                            LifecycleError::dependency_activation(task_id, dependency_id, source)
                        })?;
                }

                if task.needs_reset_on_activation() {
                    debug!(task_id = %task_id, "resetting previously dispatched task on activation");
                    self.reset_task(task_id).await?;
                } else {
                    task.activate(caller, self.now());
                    self.store.update_task(&task).await?;
                }
                self.record(task_id, TaskEventKind::Activated, Some(caller))
                    .await;
            } else {
                let honored = !self.config.is_system_activator(caller)
                    || self.config.is_system_activator(task.activated_by());
                if !honored {
                    debug!(
                        task_id = %task_id,
                        caller = %caller,
                        activated_by = %task.activated_by(),
                        "system actor may not deactivate a user-activated task"
                    );
                    return Ok(());
                }
                task.deactivate(caller);
                self.store.update_task(&task).await?;
                self.record(task_id, TaskEventKind::Deactivated, Some(caller))
                    .await;
            }

            self.update_cached_task(task.build_id(), task_id, CachedTaskUpdate::Activated(active))
                .await
        })
    }

    /// Activates the most recent earlier execution slot of the same task
    /// that has not yet finished and is not disabled.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for unknown tasks or any
    /// error from [`Self::set_active`].
    pub async fn activate_previous_task(
        &self,
        task_id: TaskId,
        caller: &ActorId,
    ) -> LifecycleResult<()> {
        let task = self.load_task(task_id).await?;
        let query = TaskQuery::History(
            HistoryQuery::before(&task)
                .with_requester(task.requester())
                .with_limit(1),
        );
        let Some(previous) = self.store.find_tasks(&query).await?.into_iter().next() else {
            debug!(task_id = %task_id, "no earlier task to activate");
            return Ok(());
        };
        if previous.is_finished() || previous.is_disabled() {
            debug!(
                task_id = %task_id,
                previous_id = %previous.id(),
                "earlier task is finished or disabled"
            );
            return Ok(());
        }
        self.set_active(previous.id(), caller, true).await
    }

    /// Deactivates every earlier, still-queued mainline execution of the
    /// same task.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for unknown tasks or any
    /// error from [`Self::set_active`].
    pub async fn deactivate_previous_tasks(
        &self,
        task_id: TaskId,
        caller: &ActorId,
    ) -> LifecycleResult<()> {
        let task = self.load_task(task_id).await?;
        let query = TaskQuery::History(
            HistoryQuery::before(&task)
                .with_requester(Requester::Mainline)
                .with_statuses([TaskStatus::Undispatched])
                .activated_only(),
        );
        for previous in self.store.find_tasks(&query).await? {
            self.set_active(previous.id(), caller, false).await?;
        }
        Ok(())
    }

    /// Requests an abort of a dispatched or running task.
    ///
    /// The task is deactivated and flagged; the agent running it observes
    /// the flag and stops.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidState`] when the task is neither
    /// dispatched nor started, or a store error.
    pub async fn abort_task(&self, task_id: TaskId, caller: &ActorId) -> LifecycleResult<()> {
        let task = self.load_task(task_id).await?;
        if !task.is_abortable() {
            return Err(LifecycleError::InvalidState {
                task_id,
                status: task.status(),
                operation: "abort",
            });
        }

        debug!(task_id = %task_id, caller = %caller, "aborting task");
        self.set_active(task_id, caller, false).await?;
        self.record(task_id, TaskEventKind::AbortRequested, Some(caller))
            .await;

        let mut aborted = self.load_task(task_id).await?;
        aborted.set_aborted();
        self.store.update_task(&aborted).await?;
        Ok(())
    }
}
