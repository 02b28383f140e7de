//! Audit records for task lifecycle transitions.

use super::{ActorId, HostId, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of lifecycle transition, with kind-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEventKind {
    /// The task was activated.
    Activated,
    /// The task was deactivated.
    Deactivated,
    /// The task was assigned to a host.
    Dispatched {
        /// Receiving host.
        host_id: HostId,
    },
    /// The task went back to the queue.
    Undispatched {
        /// Host the task was taken from, if known.
        host_id: Option<HostId>,
    },
    /// The task started executing.
    Started,
    /// The task finished.
    Finished {
        /// Host that ran the task, if known.
        host_id: Option<HostId>,
        /// Terminal status.
        status: TaskStatus,
    },
    /// An abort was requested for the running execution.
    AbortRequested,
    /// The task was reset for another execution.
    Restarted,
}

impl TaskEventKind {
    /// Returns the canonical event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Activated => "task_activated",
            Self::Deactivated => "task_deactivated",
            Self::Dispatched { .. } => "task_dispatched",
            Self::Undispatched { .. } => "task_undispatched",
            Self::Started => "task_started",
            Self::Finished { .. } => "task_finished",
            Self::AbortRequested => "task_abort_request",
            Self::Restarted => "task_restarted",
        }
    }
}

/// Immutable audit record of one lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    task_id: TaskId,
    kind: TaskEventKind,
    actor: Option<ActorId>,
    timestamp: DateTime<Utc>,
}

impl TaskEvent {
    /// Creates an event without an attributed actor.
    #[must_use]
    pub const fn new(task_id: TaskId, kind: TaskEventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            task_id,
            kind,
            actor: None,
            timestamp,
        }
    }

    /// Attributes the event to `actor`.
    #[must_use]
    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Returns the task the event is about.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the transition kind.
    #[must_use]
    pub const fn kind(&self) -> &TaskEventKind {
        &self.kind
    }

    /// Returns the responsible actor, if any.
    #[must_use]
    pub const fn actor(&self) -> Option<&ActorId> {
        self.actor.as_ref()
    }

    /// Returns when the transition happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
