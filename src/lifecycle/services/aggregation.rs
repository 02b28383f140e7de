//! Recomputing a build's status from its tasks.

use super::{LifecycleResult, TaskLifecycleService};
use crate::lifecycle::{
    domain::{
        BuildResolution, BuildStatus, BuildTally, BuildUpdate, Makespans, TaskId, TaskQuery,
    },
    ports::{EventRecorder, LifecycleStore},
};
use mockable::Clock;
use tracing::{debug, error};

impl<S, E, C> TaskLifecycleService<S, E, C>
where
    S: LifecycleStore,
    E: EventRecorder,
    C: Clock + Send + Sync,
{
    /// Recomputes the status of the task's build from all of its tasks and,
    /// when the build resolves, the status of its version and patch.
    ///
    /// The outcome is computed in memory and only the resulting status is
    /// written. Running this concurrently for sibling tasks converges on the
    /// same final state because every pass reads fresh task documents and
    /// the terminal writes are idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`super::LifecycleError::TaskNotFound`] or
    /// [`super::LifecycleError::BuildNotFound`] for unknown entities, or a
    /// store error.
    pub async fn update_build_and_version_status_for_task(
        &self,
        task_id: TaskId,
    ) -> LifecycleResult<()> {
        let task = self.load_task(task_id).await?;
        let build = self.load_build(task.build_id()).await?;
        let build_id = build.id();
        let seen_finish = build.finish_time();

        let tasks = self
            .store
            .find_tasks(&TaskQuery::ByBuild(build_id))
            .await?;
        let tally = BuildTally::from_tasks(&tasks, &self.config);
        let resolution = tally.resolution(self.config.resolution_slack);
        debug!(
            build_id = %build_id,
            total = tally.total(),
            finished = tally.finished(),
            failed = tally.failed(),
            ?resolution,
            "recomputed build status"
        );

        match resolution {
            BuildResolution::NotStarted => {
                self.store
                    .update_build(
                        build_id,
                        BuildUpdate::Status {
                            status: BuildStatus::Created,
                            seen_finish,
                        },
                    )
                    .await?;
            }
            BuildResolution::Unfinished(status) => {
                self.store
                    .update_build(
                        build_id,
                        BuildUpdate::Status {
                            status,
                            seen_finish,
                        },
                    )
                    .await?;
            }
            BuildResolution::AwaitingPush => {
                debug!(build_id = %build_id, "deferring build completion until push finishes");
                self.store
                    .update_build(
                        build_id,
                        BuildUpdate::Status {
                            status: BuildStatus::Started,
                            seen_finish,
                        },
                    )
                    .await?;
            }
            BuildResolution::Resolved(status) => {
                let finish_time = self.now();
                self.store
                    .update_build(build_id, BuildUpdate::Finish { status, at: finish_time })
                    .await
                    .inspect_err(|err| {
                        error!(build_id = %build_id, error = %err, "failed to finish build");
                    })?;
                self.propagate_build_completion(&build, finish_time)
                    .await?;
                self.store
                    .update_build(build_id, BuildUpdate::Makespans(Makespans::from_tasks(&tasks)))
                    .await
                    .inspect_err(|err| {
                        error!(build_id = %build_id, error = %err, "failed to update makespans");
                    })?;
            }
        }
        Ok(())
    }
}
