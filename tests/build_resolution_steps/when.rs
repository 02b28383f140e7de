//! When steps for build resolution BDD scenarios.

use super::world::{ResolutionWorld, run_async};
use chrono::Utc;
use rstest_bdd_macros::when;
use stepback::lifecycle::{
    domain::FinishDetail,
    services::{MarkEndRequest, ResetTaskRequest},
};

#[when(r#"task "{name}" finishes with "{outcome}""#)]
fn task_finishes(
    world: &mut ResolutionWorld,
    name: String,
    outcome: String,
) -> Result<(), eyre::Report> {
    let detail = match outcome.as_str() {
        "success" => FinishDetail::succeeded(),
        "failed" => FinishDetail::failed(),
        other => return Err(eyre::eyre!("unknown finish outcome {other:?}")),
    };
    let task_id = world.task_id(&name)?;
    run_async(world.service.mark_end(
        MarkEndRequest::new(task_id, "host-1", Utc::now(), detail),
        &world.settings,
    ))?;
    Ok(())
}

#[when(r#"task "{name}" is reset from "{origin}""#)]
fn task_is_reset(
    world: &mut ResolutionWorld,
    name: String,
    origin: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&name)?;
    let result = run_async(
        world
            .service
            .try_reset_task(ResetTaskRequest::new(task_id, "alice", origin), &world.settings),
    );
    world.last_result = Some(result);
    Ok(())
}
