//! Service struct and the plumbing shared by every lifecycle operation.

use super::{LifecycleError, LifecycleResult};
use crate::lifecycle::{
    domain::{
        ActorId, Build, BuildId, BuildUpdate, CachedTaskUpdate, LifecycleConfig, Task, TaskEvent,
        TaskEventKind, TaskId,
    },
    ports::{EventRecorder, LifecycleStore},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::warn;

/// Task status propagation service.
///
/// Every operation reads the current task from the store, applies the
/// transition, persists it, and then pushes the consequences outward to the
/// build cache, the build status, the version, and the patch. Event
/// recording is best-effort: a failing recorder is logged and ignored.
#[derive(Clone)]
pub struct TaskLifecycleService<S, E, C>
where
    S: LifecycleStore,
    E: EventRecorder,
    C: Clock + Send + Sync,
{
    pub(super) store: Arc<S>,
    pub(super) events: Arc<E>,
    pub(super) clock: Arc<C>,
    pub(super) config: LifecycleConfig,
}

impl<S, E, C> TaskLifecycleService<S, E, C>
where
    S: LifecycleStore,
    E: EventRecorder,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, events: Arc<E>, clock: Arc<C>, config: LifecycleConfig) -> Self {
        Self {
            store,
            events,
            clock,
            config,
        }
    }

    /// Returns the policy knobs the service runs with.
    #[must_use]
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub(super) fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    pub(super) async fn load_task(&self, task_id: TaskId) -> LifecycleResult<Task> {
        self.store
            .find_task(task_id)
            .await?
            .ok_or(LifecycleError::TaskNotFound(task_id))
    }

    pub(super) async fn load_build(&self, build_id: BuildId) -> LifecycleResult<Build> {
        self.store
            .find_build(build_id)
            .await?
            .ok_or(LifecycleError::BuildNotFound(build_id))
    }

    pub(super) async fn update_cached_task(
        &self,
        build_id: BuildId,
        task_id: TaskId,
        update: CachedTaskUpdate,
    ) -> LifecycleResult<()> {
        self.store
            .update_build(build_id, BuildUpdate::CachedTask { task_id, update })
            .await?;
        Ok(())
    }

    pub(super) async fn record(
        &self,
        task_id: TaskId,
        kind: TaskEventKind,
        actor: Option<&ActorId>,
    ) {
        let name = kind.as_str();
        let mut event = TaskEvent::new(task_id, kind, self.now());
        if let Some(actor) = actor {
            event = event.with_actor(actor.clone());
        }
        if let Err(err) = self.events.record(event).await {
            warn!(task_id = %task_id, event = name, error = %err, "failed to record task event");
        }
    }
}
