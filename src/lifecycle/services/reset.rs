//! Restarting tasks for another execution.

use super::{LifecycleError, LifecycleResult, MarkEndRequest, TaskLifecycleService};
use crate::lifecycle::{
    domain::{
        ActorId, ArchivedTask, CachedTaskUpdate, FinishDetail, ProjectSettings, TaskEventKind,
        TaskId,
    },
    ports::{EventRecorder, LifecycleStore},
};
use mockable::Clock;
use tracing::{debug, error};

/// Request payload for [`TaskLifecycleService::try_reset_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTaskRequest {
    task_id: TaskId,
    user: ActorId,
    origin: String,
    detail: Option<FinishDetail>,
}

impl ResetTaskRequest {
    /// Creates a reset request from `user`, arriving through `origin`.
    #[must_use]
    pub fn new(task_id: TaskId, user: impl Into<ActorId>, origin: impl Into<String>) -> Self {
        Self {
            task_id,
            user: user.into(),
            origin: origin.into(),
            detail: None,
        }
    }

    /// Closes the current execution with `detail` before resetting.
    #[must_use]
    pub fn with_detail(mut self, detail: FinishDetail) -> Self {
        self.detail = Some(detail);
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
    /// Unconditionally resets a task for a fresh execution.
    ///
    /// The current execution is archived first. The build cache entry and
    /// the build status follow.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskNotFound`] for unknown tasks or a
    /// store error.
    pub async fn reset_task(&self, task_id: TaskId) -> LifecycleResult<()> {
        let mut task = self.load_task(task_id).await?;
        let now = self.now();

        self.store
            .archive_task(ArchivedTask::capture(&task, now))
            .await?;
        task.reset(now);
        self.store.update_task(&task).await?;
        debug!(task_id = %task_id, execution = task.execution(), "task reset");

        self.update_cached_task(task.build_id(), task_id, CachedTaskUpdate::Reset)
            .await?;
        self.update_build_and_version_status_for_task(task_id)
            .await
    }

    /// Resets a task subject to the execution cap.
    ///
    /// Once a task has run `max_task_execution` times only a UI request may
    /// reset it again; any other origin finalizes the task with the supplied
    /// detail instead. Non-UI origins may only reset finished tasks.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::MissingFinishDetail`] when a capped task is
    /// reset by a non-UI origin without a detail,
    /// [`LifecycleError::InvalidState`] when a non-UI origin resets an
    /// unfinished task, or any error from [`Self::reset_task`].
    pub async fn try_reset_task(
        &self,
        request: ResetTaskRequest,
        project: &ProjectSettings,
    ) -> LifecycleResult<()> {
        let ResetTaskRequest {
            task_id,
            user,
            origin,
            detail,
        } = request;
        let task = self.load_task(task_id).await?;
        let from_ui = self.config.is_ui_origin(&origin);

        if task.execution() >= self.config.max_task_execution {
            if from_ui {
                debug!(
                    task_id = %task_id,
                    execution = task.execution(),
                    user = %user,
                    "allowing reset beyond the execution cap for a UI request"
                );
            } else {
                let Some(final_detail) = detail else {
                    error!(
                        task_id = %task_id,
                        origin = %origin,
                        "capped task reset without a finish detail"
                    );
                    return Err(LifecycleError::MissingFinishDetail { task_id, origin });
                };
                debug!(
                    task_id = %task_id,
                    execution = task.execution(),
                    "execution cap reached; finalizing instead of resetting"
                );
                let finalize =
                    MarkEndRequest::new(task_id, ActorId::new(origin), self.now(), final_detail);
                return self.mark_end(finalize, project).await;
            }
        }

        if !task.is_finished() && !from_ui {
            return Err(LifecycleError::InvalidState {
                task_id,
                status: task.status(),
                operation: "reset",
            });
        }

        if let Some(closing_detail) = detail {
            let mut closed = task;
            closed.mark_end(self.now(), closing_detail);
            self.store.update_task(&closed).await?;
        }

        self.reset_task(task_id).await?;
        let actor = if from_ui { user } else { ActorId::new(origin) };
        self.record(task_id, TaskEventKind::Restarted, Some(&actor))
            .await;
        Ok(())
    }
}
