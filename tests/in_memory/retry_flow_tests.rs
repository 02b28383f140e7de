//! Retry paths: stepback after a regression, resets and dispatch round trips.

use rstest::rstest;
use stepback::lifecycle::{
    domain::{
        BuildStatus, DistroId, FinishDetail, HostId, Requester, TaskEventKind, TaskStatus,
    },
    services::ResetTaskRequest,
};

use super::helpers::{Lifecycle, agent_finish, lifecycle, project};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn regression_steps_back_to_the_skipped_revision(
    lifecycle: Lifecycle,
) -> Result<(), eyre::Report> {
    let baseline_version = lifecycle.seed_version(Requester::Mainline).await?;
    let (_, baseline) = lifecycle
        .seed_running_build(baseline_version, "linux", 1, &["unit"])
        .await?;
    let skipped_version = lifecycle.seed_version(Requester::Mainline).await?;
    let (_, skipped) = lifecycle
        .seed_queued_build(skipped_version, "linux", 2, &["unit"])
        .await?;
    let head_version = lifecycle.seed_version(Requester::Mainline).await?;
    let (_, head) = lifecycle
        .seed_running_build(head_version, "linux", 3, &["unit"])
        .await?;
    let ([baseline_unit], [skipped_unit], [head_unit]) =
        (baseline.as_slice(), skipped.as_slice(), head.as_slice())
    else {
        eyre::bail!("expected one task per build");
    };

    assert!(!lifecycle.task(*skipped_unit).await?.is_active());

    lifecycle
        .service
        .mark_end(agent_finish(*baseline_unit, FinishDetail::succeeded()), &project(true))
        .await?;
    lifecycle
        .service
        .mark_end(agent_finish(*head_unit, FinishDetail::failed()), &project(true))
        .await?;

    let stepped_back = lifecycle.task(*skipped_unit).await?;
    assert!(stepped_back.is_active());
    assert_eq!(stepped_back.activated_by().as_str(), "stepback");
    let activated = lifecycle
        .events
        .events_for(*skipped_unit)
        .iter()
        .any(|event| event.kind() == &TaskEventKind::Activated);
    assert!(activated, "stepback should log an activation");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dispatched_task_can_be_retried_after_failure(
    lifecycle: Lifecycle,
) -> Result<(), eyre::Report> {
    let version_id = lifecycle.seed_version(Requester::Mainline).await?;
    let (build_id, tasks) = lifecycle
        .seed_running_build(version_id, "linux", 5, &["unit"])
        .await?;
    let [unit] = tasks.as_slice() else {
        eyre::bail!("expected one seeded task");
    };

    lifecycle
        .service
        .mark_end(agent_finish(*unit, FinishDetail::failed()), &project(false))
        .await?;
    assert_eq!(lifecycle.build(build_id).await?.status(), BuildStatus::Failed);

    lifecycle
        .service
        .try_reset_task(ResetTaskRequest::new(*unit, "alice", "ui"), &project(false))
        .await?;
    let mut retried = lifecycle.task(*unit).await?;
    assert_eq!(retried.execution(), 1);
    assert_eq!(retried.status(), TaskStatus::Undispatched);

    lifecycle
        .service
        .mark_task_dispatched(&mut retried, HostId::new("host-2"), DistroId::new("ubuntu"))
        .await?;
    lifecycle.service.mark_start(*unit).await?;
    lifecycle
        .service
        .mark_end(agent_finish(*unit, FinishDetail::succeeded()), &project(false))
        .await?;

    let build = lifecycle.build(build_id).await?;
    assert_eq!(build.status(), BuildStatus::Succeeded);
    let archived = lifecycle.archived_executions(*unit).await?;
    assert_eq!(archived, 1);
    Ok(())
}
