//! Finishes racing on separate Tokio tasks converge on one final state.

use rstest::rstest;
use stepback::lifecycle::domain::{
    BuildStatus, FinishDetail, Requester, TaskEventKind, TaskStatus, VersionStatus,
};

use super::helpers::{Lifecycle, agent_finish, lifecycle, project};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sibling_finishes_resolve_the_build_once(
    lifecycle: Lifecycle,
) -> Result<(), eyre::Report> {
    let version_id = lifecycle.seed_version(Requester::Mainline).await?;
    let (build_id, tasks) = lifecycle
        .seed_running_build(version_id, "linux", 11, &["unit", "lint"])
        .await?;
    let [unit, lint] = tasks.as_slice() else {
        eyre::bail!("expected two seeded tasks");
    };

    let unit_handle =
        lifecycle.spawn_finish(agent_finish(*unit, FinishDetail::succeeded()), project(false));
    let lint_handle =
        lifecycle.spawn_finish(agent_finish(*lint, FinishDetail::succeeded()), project(false));
    unit_handle.await??;
    lint_handle.await??;

    let build = lifecycle.build(build_id).await?;
    assert_eq!(build.status(), BuildStatus::Succeeded);
    assert!(build.is_finished());
    assert_eq!(
        lifecycle.version(version_id).await?.status(),
        VersionStatus::Succeeded
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_build_completions_finish_the_version(
    lifecycle: Lifecycle,
) -> Result<(), eyre::Report> {
    let version_id = lifecycle.seed_version(Requester::Mainline).await?;
    let (_, linux_tasks) = lifecycle
        .seed_running_build(version_id, "linux", 11, &["unit"])
        .await?;
    let (_, windows_tasks) = lifecycle
        .seed_running_build(version_id, "windows", 11, &["unit"])
        .await?;
    let [linux_unit] = linux_tasks.as_slice() else {
        eyre::bail!("expected one linux task");
    };
    let [windows_unit] = windows_tasks.as_slice() else {
        eyre::bail!("expected one windows task");
    };

    let linux_handle = lifecycle.spawn_finish(
        agent_finish(*linux_unit, FinishDetail::succeeded()),
        project(false),
    );
    let windows_handle = lifecycle.spawn_finish(
        agent_finish(*windows_unit, FinishDetail::succeeded()),
        project(false),
    );
    linux_handle.await??;
    windows_handle.await??;

    let version = lifecycle.version(version_id).await?;
    assert_eq!(version.status(), VersionStatus::Succeeded);
    assert!(version.progress().finish_time().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_agent_reports_record_a_single_finish(
    lifecycle: Lifecycle,
) -> Result<(), eyre::Report> {
    let version_id = lifecycle.seed_version(Requester::Mainline).await?;
    let (build_id, tasks) = lifecycle
        .seed_running_build(version_id, "linux", 11, &["unit"])
        .await?;
    let [unit] = tasks.as_slice() else {
        eyre::bail!("expected one seeded task");
    };

    let handles: Vec<_> = (0..4)
        .map(|_| {
            lifecycle.spawn_finish(agent_finish(*unit, FinishDetail::failed()), project(false))
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    let finishes = lifecycle
        .events
        .events_for(*unit)
        .iter()
        .filter(|event| matches!(event.kind(), TaskEventKind::Finished { .. }))
        .count();
    assert_eq!(finishes, 1);
    assert_eq!(lifecycle.task(*unit).await?.status(), TaskStatus::Failed);
    assert_eq!(
        lifecycle.build(build_id).await?.status(),
        BuildStatus::Failed
    );
    Ok(())
}
