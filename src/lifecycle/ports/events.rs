//! Event recorder port for the lifecycle audit log.

use crate::lifecycle::domain::TaskEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event recorder operations.
pub type EventRecorderResult<T> = Result<T, EventRecorderError>;

/// Append-only audit log of lifecycle transitions.
#[async_trait]
pub trait EventRecorder: Send + Sync {
    /// Appends `event` to the log.
    ///
    /// # Errors
    ///
    /// Returns [`EventRecorderError`] when the append fails.
    async fn record(&self, event: TaskEvent) -> EventRecorderResult<()>;
}

/// Errors returned by event recorder implementations.
#[derive(Debug, Clone, Error)]
pub enum EventRecorderError {
    /// The log rejected or failed to persist the event.
    #[error("event log unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventRecorderError {
    /// Wraps an underlying failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
