//! Finishing tasks and the follow-on work a finish triggers.

use super::{LifecycleError, LifecycleResult, TaskLifecycleService};
use crate::lifecycle::{
    domain::{
        ActorId, CachedTaskUpdate, FinishDetail, FinishStatus, ProjectSettings, Task,
        TaskEventKind, TaskId,
    },
    ports::{EventRecorder, LifecycleStore},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, warn};

/// Request payload for [`TaskLifecycleService::mark_end`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkEndRequest {
    task_id: TaskId,
    caller: ActorId,
    finish_time: DateTime<Utc>,
    detail: FinishDetail,
    deactivate_previous: bool,
}

impl MarkEndRequest {
    /// Creates a request to finish `task_id` at `finish_time`.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        caller: impl Into<ActorId>,
        finish_time: DateTime<Utc>,
        detail: FinishDetail,
    ) -> Self {
        Self {
            task_id,
            caller: caller.into(),
            finish_time,
            detail,
            deactivate_previous: false,
        }
    }

    /// Deactivates earlier queued executions when the task succeeds.
    #[must_use]
    pub const fn with_deactivate_previous(mut self, deactivate_previous: bool) -> Self {
        self.deactivate_previous = deactivate_previous;
        self
    }

    /// Returns the addressed task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

impl<S, E, C> TaskLifecycleService<S, E, C>
where
    S: LifecycleStore,
    E: EventRecorder,
    C: Clock + Send + Sync,
{
    /// Finalizes a task execution and propagates the result.
    ///
    /// Finishing a task with the status it already has is a logged no-op.
    /// For mainline work a failure may step back and a success may retire
    /// older queued executions. The build, version, and patch are then
    /// recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for unknown tasks, a store
    /// error when the task itself cannot be updated, or a wrapping
    /// [`LifecycleError::Stepback`], [`LifecycleError::DeactivatePrevious`],
    /// or [`LifecycleError::BuildStatusUpdate`] when the follow-on work fails
    /// after the task was finished.
    pub async fn mark_end(
        &self,
        request: MarkEndRequest,
        project: &ProjectSettings,
    ) -> LifecycleResult<()> {
        let MarkEndRequest {
            task_id,
            caller,
            finish_time,
            detail,
            deactivate_previous,
        } = request;
        let mut task = self.load_task(task_id).await?;
        let status = detail.status();

        if task.status() == status.task_status() {
            warn!(
                task_id = %task_id,
                status = %task.status(),
                "task is already finished with this status"
            );
            return Ok(());
        }

        let previous = task.status();
        task.mark_end(finish_time, detail);
        if !self.store.finish_task(&task, previous).await? {
            warn!(
                task_id = %task_id,
                expected = %previous,
                "task changed while finishing; dropping duplicate completion"
            );
            return Ok(());
        }
        self.record(
            task_id,
            TaskEventKind::Finished {
                host_id: task.host_id().cloned(),
                status: task.status(),
            },
            Some(&caller),
        )
        .await;
        self.update_cached_task(
            task.build_id(),
            task_id,
            CachedTaskUpdate::Finished {
                status: task.status(),
                time_taken: task.time_taken(),
            },
        )
        .await?;

        if task.requester().is_patch() {
            return self.refresh_build_status(&task).await;
        }

        if status == FinishStatus::Failed {
            if project.stepback_for(task.display_name(), task.build_variant()) {
                self.do_stepback(&task)
                    .await
                    .map_err(|source| LifecycleError::stepback(task_id, source))?;
            } else {
                debug!(task_id = %task_id, "stepback disabled for this task");
            }
        } else if deactivate_previous {
            self.deactivate_previous_tasks(task_id, &caller)
                .await
                .map_err(|source| LifecycleError::deactivate_previous(task_id, source))?;
        }

        self.refresh_build_status(&task).await
    }

    async fn refresh_build_status(&self, task: &Task) -> LifecycleResult<()> {
        self.update_build_and_version_status_for_task(task.id())
            .await
            .map_err(|source| {
                LifecycleError::build_status_update(task.id(), task.build_id(), source)
            })
    }
}
