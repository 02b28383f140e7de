//! Closed status and requester enumerations.

use super::ParseStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Scheduled for a build but never queued.
    Created,
    /// Waiting to be picked up by a host.
    Undispatched,
    /// Assigned to a host.
    Dispatched,
    /// Running on a host.
    Started,
    /// Finished successfully.
    Succeeded,
    /// Finished unsuccessfully.
    Failed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Undispatched => "undispatched",
            Self::Dispatched => "dispatched",
            Self::Started => "started",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` once the task has a terminal result.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns `true` while an execution is in flight on a host.
    #[must_use]
    pub const fn is_abortable(self) -> bool {
        matches!(self, Self::Dispatched | Self::Started)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "undispatched" => Ok(Self::Undispatched),
            "dispatched" => Ok(Self::Dispatched),
            "started" => Ok(Self::Started),
            "succeeded" | "success" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseStatusError::new("task", value)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status reported for a finished task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishStatus {
    /// The execution passed.
    Succeeded,
    /// The execution failed.
    Failed,
}

impl FinishStatus {
    /// Returns the task status a task takes on when finished with this result.
    #[must_use]
    pub const fn task_status(self) -> TaskStatus {
        match self {
            Self::Succeeded => TaskStatus::Succeeded,
            Self::Failed => TaskStatus::Failed,
        }
    }

    /// Returns `true` for a passing result.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl From<FinishStatus> for TaskStatus {
    fn from(value: FinishStatus) -> Self {
        value.task_status()
    }
}

/// Status of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// No task of the build has finished yet.
    Created,
    /// At least one task has started or finished without failures so far.
    Started,
    /// Resolved successfully.
    Succeeded,
    /// Resolved with at least one failure.
    Failed,
}

impl BuildStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for resolved builds.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl TryFrom<&str> for BuildStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "started" => Ok(Self::Started),
            "succeeded" | "success" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseStatusError::new("build", value)),
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status shared by versions and patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Nothing has started yet.
    Created,
    /// The first task has started.
    Started,
    /// Every build resolved successfully.
    Succeeded,
    /// Every build resolved and at least one failed.
    Failed,
}

impl VersionStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` once completion has been recorded.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of pipeline invocation that produced a task, build or version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requester {
    /// A commit on the tracked branch.
    Mainline,
    /// A user-submitted patch.
    Patch,
    /// A downstream trigger.
    Trigger,
    /// An ad hoc periodic or manual run.
    Adhoc,
}

impl Requester {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainline => "mainline",
            Self::Patch => "patch",
            Self::Trigger => "trigger",
            Self::Adhoc => "adhoc",
        }
    }

    /// Returns `true` for patch runs, which keep out of stepback.
    #[must_use]
    pub const fn is_patch(self) -> bool {
        matches!(self, Self::Patch)
    }
}

impl TryFrom<&str> for Requester {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mainline" => Ok(Self::Mainline),
            "patch" => Ok(Self::Patch),
            "trigger" => Ok(Self::Trigger),
            "adhoc" => Ok(Self::Adhoc),
            _ => Err(ParseStatusError::new("requester", value)),
        }
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
