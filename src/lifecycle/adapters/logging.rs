//! Event recorder that writes lifecycle events to the `tracing` facade.

use async_trait::async_trait;

use crate::lifecycle::{
    domain::TaskEvent,
    ports::{EventRecorder, EventRecorderResult},
};

/// Emits each lifecycle event as an `info`-level tracing record.
///
/// Useful where no durable audit log is wired in; delivery depends entirely
/// on the installed subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventRecorder;

#[async_trait]
impl EventRecorder for TracingEventRecorder {
    async fn record(&self, event: TaskEvent) -> EventRecorderResult<()> {
        tracing::info!(
            task_id = %event.task_id(),
            event = event.kind().as_str(),
            actor = event.actor().map_or("", |actor| actor.as_str()),
            timestamp = %event.timestamp(),
            "task lifecycle event"
        );
        Ok(())
    }
}
