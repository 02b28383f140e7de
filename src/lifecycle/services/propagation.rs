//! Rolling finished builds up into versions and patches.

use super::{LifecycleResult, TaskLifecycleService};
use crate::lifecycle::{
    domain::{Build, BuildStatus, ProgressUpdate, VersionId, VersionStatus},
    ports::{EventRecorder, LifecycleStore},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info};

impl<S, E, C> TaskLifecycleService<S, E, C>
where
    S: LifecycleStore,
    E: EventRecorder,
    C: Clock + Send + Sync,
{
    pub(super) async fn propagate_build_completion(
        &self,
        build: &Build,
        finish_time: DateTime<Utc>,
    ) -> LifecycleResult<()> {
        self.mark_version_completed(build.version_id(), finish_time)
            .await?;
        if build.requester().is_patch() {
            self.try_mark_patch_finished(build.version_id(), finish_time)
                .await?;
        }
        Ok(())
    }

    /// Finishes the version once every one of its builds has finished.
    ///
    /// The version fails if any build failed. Repeated calls are harmless.
    ///
    /// # Errors
    ///
    /// Returns a store error, including
    /// [`crate::lifecycle::ports::StoreError::VersionNotFound`].
    pub async fn mark_version_completed(
        &self,
        version_id: VersionId,
        finish_time: DateTime<Utc>,
    ) -> LifecycleResult<()> {
        let Some(status) = self.completed_status(version_id).await? else {
            debug!(version_id = %version_id, "version still has unfinished builds");
            return Ok(());
        };
        let changed = self
            .store
            .update_version(version_id, ProgressUpdate::Finish { status, at: finish_time })
            .await?;
        if changed {
            info!(version_id = %version_id, status = %status, "version finished");
        }
        Ok(())
    }

    /// Finishes the patch wrapping the version, if there is one, once every
    /// build of the version has finished.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn try_mark_patch_finished(
        &self,
        version_id: VersionId,
        finish_time: DateTime<Utc>,
    ) -> LifecycleResult<()> {
        if self.store.find_patch(version_id).await?.is_none() {
            debug!(version_id = %version_id, "no patch wraps this version");
            return Ok(());
        }
        let Some(status) = self.completed_status(version_id).await? else {
            return Ok(());
        };
        let changed = self
            .store
            .update_patch(version_id, ProgressUpdate::Finish { status, at: finish_time })
            .await?;
        if changed {
            info!(version_id = %version_id, status = %status, "patch finished");
        }
        Ok(())
    }

    async fn completed_status(&self, version_id: VersionId) -> LifecycleResult<Option<VersionStatus>> {
        let builds = self.store.find_builds_by_version(version_id).await?;
        if builds.iter().any(|build| !build.is_finished()) {
            return Ok(None);
        }
        let failed = builds
            .iter()
            .any(|build| build.status() == BuildStatus::Failed);
        Ok(Some(if failed {
            VersionStatus::Failed
        } else {
            VersionStatus::Succeeded
        }))
    }
}
