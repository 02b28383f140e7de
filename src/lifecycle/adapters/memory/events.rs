//! In-memory audit log.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::lifecycle::{
    domain::{TaskEvent, TaskId},
    ports::{EventRecorder, EventRecorderError, EventRecorderResult},
};

/// Thread-safe append-only event log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<TaskEvent>>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded event in append order.
    #[must_use]
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the events recorded for one task in append order.
    #[must_use]
    pub fn events_for(&self, task_id: TaskId) -> Vec<TaskEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.task_id() == task_id)
            .collect()
    }
}

#[async_trait]
impl EventRecorder for InMemoryEventLog {
    async fn record(&self, event: TaskEvent) -> EventRecorderResult<()> {
        let mut events = self.events.write().map_err(|err| {
            EventRecorderError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        events.push(event);
        Ok(())
    }
}
