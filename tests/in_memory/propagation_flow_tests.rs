//! Finishing tasks and watching the result reach builds, versions and patches.

use rstest::rstest;
use stepback::lifecycle::domain::{
    BuildStatus, FinishDetail, Requester, TaskStatus, VersionStatus,
};

use super::helpers::{Lifecycle, agent_finish, lifecycle, project};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finished_builds_complete_the_version(
    lifecycle: Lifecycle,
) -> Result<(), eyre::Report> {
    let version_id = lifecycle.seed_version(Requester::Mainline).await?;
    let (linux, linux_tasks) = lifecycle
        .seed_running_build(version_id, "linux", 7, &["unit"])
        .await?;
    let (windows, windows_tasks) = lifecycle
        .seed_running_build(version_id, "windows", 7, &["unit"])
        .await?;

    for task_id in linux_tasks.iter().chain(&windows_tasks) {
        lifecycle
            .service
            .mark_end(agent_finish(*task_id, FinishDetail::succeeded()), &project(false))
            .await?;
    }

    for build_id in [linux, windows] {
        let build = lifecycle.build(build_id).await?;
        eyre::ensure!(
            build.status() == BuildStatus::Succeeded,
            "build {build_id} ended as {:?}",
            build.status()
        );
        eyre::ensure!(build.finish_time().is_some(), "build {build_id} has no finish time");
    }
    let version = lifecycle.version(version_id).await?;
    eyre::ensure!(
        version.status() == VersionStatus::Succeeded,
        "version ended as {:?}",
        version.status()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_failed_build_fails_the_patch(lifecycle: Lifecycle) -> Result<(), eyre::Report> {
    let version_id = lifecycle.seed_version(Requester::Patch).await?;
    let (_, linux_tasks) = lifecycle
        .seed_running_build(version_id, "linux", 7, &["unit"])
        .await?;
    let (_, windows_tasks) = lifecycle
        .seed_running_build(version_id, "windows", 7, &["unit"])
        .await?;
    let linux_unit = *linux_tasks
        .first()
        .ok_or_else(|| eyre::eyre!("linux build has no tasks"))?;
    let windows_unit = *windows_tasks
        .first()
        .ok_or_else(|| eyre::eyre!("windows build has no tasks"))?;

    lifecycle
        .service
        .mark_end(agent_finish(linux_unit, FinishDetail::failed()), &project(false))
        .await?;
    lifecycle
        .service
        .mark_end(agent_finish(windows_unit, FinishDetail::succeeded()), &project(false))
        .await?;

    let patch = lifecycle.patch(version_id).await?;
    assert_eq!(patch.status(), VersionStatus::Failed);
    assert!(patch.progress().finish_time().is_some());
    assert_eq!(
        lifecycle.version(version_id).await?.status(),
        VersionStatus::Failed
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn push_holds_the_build_open_until_it_finishes(
    lifecycle: Lifecycle,
) -> Result<(), eyre::Report> {
    let version_id = lifecycle.seed_version(Requester::Mainline).await?;
    let (build_id, tasks) = lifecycle
        .seed_running_build(version_id, "linux", 3, &["compile", "unit", "push"])
        .await?;
    let [compile, unit, push] = tasks.as_slice() else {
        eyre::bail!("expected three seeded tasks");
    };

    for task_id in [compile, unit] {
        lifecycle
            .service
            .mark_end(agent_finish(*task_id, FinishDetail::succeeded()), &project(false))
            .await?;
    }
    let open = lifecycle.build(build_id).await?;
    assert_eq!(open.status(), BuildStatus::Started);
    assert!(open.finish_time().is_none());

    lifecycle
        .service
        .mark_end(agent_finish(*push, FinishDetail::failed()), &project(false))
        .await?;
    let closed = lifecycle.build(build_id).await?;
    assert_eq!(closed.status(), BuildStatus::Failed);
    assert_eq!(
        closed.cached_task(*push).map(|cached| cached.status),
        Some(TaskStatus::Failed)
    );
    Ok(())
}
