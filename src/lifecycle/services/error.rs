//! Service-level errors for lifecycle operations.

use crate::lifecycle::{
    domain::{BuildId, HostId, LifecycleDomainError, TaskId, TaskStatus},
    ports::StoreError,
};
use thiserror::Error;

/// Errors returned by [`super::TaskLifecycleService`].
///
/// Orchestration failures that happen after the primary mutation has been
/// persisted carry the task and build they concern and wrap the underlying
/// cause, so callers can tell "the task finished but the build roll-up
/// failed" apart from "the task could not be finished".
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The build does not exist.
    #[error("build not found: {0}")]
    BuildNotFound(BuildId),

    /// The task is in a status that does not permit the operation.
    #[error("cannot {operation} task {task_id} while it is {status}")]
    InvalidState {
        /// Task that was addressed.
        task_id: TaskId,
        /// Its status at the time of the request.
        status: TaskStatus,
        /// Operation that was refused.
        operation: &'static str,
    },

    /// A capped task was reset by a non-interactive origin without a finish
    /// detail to close the current execution with.
    #[error("task {task_id} reached its execution cap and {origin} supplied no finish detail")]
    MissingFinishDetail {
        /// Task that was addressed.
        task_id: TaskId,
        /// Origin of the reset request.
        origin: String,
    },

    /// Activating a dependency failed.
    #[error("failed to activate dependency {dependency_id} of task {task_id}")]
    DependencyActivation {
        /// Task being activated.
        task_id: TaskId,
        /// Dependency that could not be activated.
        dependency_id: TaskId,
        /// Underlying failure.
        #[source]
        source: Box<Self>,
    },

    /// Recomputing the parent build after a task transition failed.
    #[error("failed to update status of build {build_id} after task {task_id} finished")]
    BuildStatusUpdate {
        /// Task that transitioned.
        task_id: TaskId,
        /// Build whose status could not be updated.
        build_id: BuildId,
        /// Underlying failure.
        #[source]
        source: Box<Self>,
    },

    /// Stepping back from a failed task failed.
    #[error("failed to step back from task {task_id}")]
    Stepback {
        /// Task that failed.
        task_id: TaskId,
        /// Underlying failure.
        #[source]
        source: Box<Self>,
    },

    /// Deactivating older queued executions failed.
    #[error("failed to deactivate tasks preceding {task_id}")]
    DeactivatePrevious {
        /// Task that succeeded.
        task_id: TaskId,
        /// Underlying failure.
        #[source]
        source: Box<Self>,
    },

    /// Persisting a dispatch transition failed.
    #[error("failed to record dispatch transition of task {task_id} on host {host_id:?}")]
    Dispatch {
        /// Task being dispatched or returned.
        task_id: TaskId,
        /// Host involved, when known.
        host_id: Option<HostId>,
        /// Underlying failure.
        #[source]
        source: Box<Self>,
    },

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Domain invariant violated.
    #[error(transparent)]
    Domain(#[from] LifecycleDomainError),
}

impl LifecycleError {
    pub(super) fn dependency_activation(task_id: TaskId, dependency_id: TaskId, source: Self) -> Self {
        Self::DependencyActivation {
            task_id,
            dependency_id,
            source: Box::new(source),
        }
    }

    pub(super) fn build_status_update(task_id: TaskId, build_id: BuildId, source: Self) -> Self {
        Self::BuildStatusUpdate {
            task_id,
            build_id,
            source: Box::new(source),
        }
    }

    pub(super) fn stepback(task_id: TaskId, source: Self) -> Self {
        Self::Stepback {
            task_id,
            source: Box::new(source),
        }
    }

    pub(super) fn deactivate_previous(task_id: TaskId, source: Self) -> Self {
        Self::DeactivatePrevious {
            task_id,
            source: Box::new(source),
        }
    }

    pub(super) fn dispatch(task_id: TaskId, host_id: Option<HostId>, source: Self) -> Self {
        Self::Dispatch {
            task_id,
            host_id,
            source: Box::new(source),
        }
    }
}

/// Result type for lifecycle service operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
