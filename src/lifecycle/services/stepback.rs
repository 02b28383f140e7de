//! Stepback: activating earlier executions after a failure to bisect it.

use super::{LifecycleResult, TaskLifecycleService};
use crate::lifecycle::{
    domain::{HistoryQuery, ProjectSettings, Task, TaskId, TaskQuery, TaskStatus},
    ports::{EventRecorder, LifecycleStore},
};
use mockable::Clock;
use tracing::debug;

impl<S, E, C> TaskLifecycleService<S, E, C>
where
    S: LifecycleStore,
    E: EventRecorder,
    C: Clock + Send + Sync,
{
    /// Returns whether a failure of the task should trigger stepback.
    ///
    /// A task-level override wins over a variant-level override, which wins
    /// over the project default.
    ///
    /// # Errors
    ///
    /// Returns [`super::LifecycleError::TaskNotFound`] for unknown tasks.
    pub async fn stepback_policy(
        &self,
        task_id: TaskId,
        project: &ProjectSettings,
    ) -> LifecycleResult<bool> {
        let task = self.load_task(task_id).await?;
        Ok(project.stepback_for(task.display_name(), task.build_variant()))
    }

    /// Activates the previous execution of a failed task.
    ///
    /// Nothing happens unless an earlier execution with the same requester
    /// succeeded; without a passing baseline there is nothing to bisect.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::activate_previous_task`].
    pub async fn do_stepback(&self, task: &Task) -> LifecycleResult<()> {
        let query = TaskQuery::History(
            HistoryQuery::before(task)
                .with_requester(task.requester())
                .with_statuses([TaskStatus::Succeeded])
                .with_limit(1),
        );
        if self.store.find_tasks(&query).await?.is_empty() {
            debug!(
                task_id = %task.id(),
                display_name = task.display_name(),
                "no earlier success to step back towards"
            );
            return Ok(());
        }

        self.activate_previous_task(task.id(), &self.config.stepback_activator)
            .await
    }
}
