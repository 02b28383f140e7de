//! Error types for lifecycle domain validation and parsing.

use super::{BuildId, TaskId};
use thiserror::Error;

/// Errors raised when a domain invariant would be violated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleDomainError {
    /// The build carries no cached summary entry for the task.
    #[error("build {build_id} has no cached entry for task {task_id}")]
    CachedTaskNotFound {
        /// Build whose cache was addressed.
        build_id: BuildId,
        /// Task missing from the cache.
        task_id: TaskId,
    },
}

/// Error returned while parsing a status or requester from storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct ParseStatusError {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected raw value.
    pub value: String,
}

impl ParseStatusError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
