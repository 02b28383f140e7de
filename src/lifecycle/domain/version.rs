//! Version and patch entities.

use super::{ProjectId, Requester, VersionId, VersionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field-level progress change shared by versions and patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Mark started unless already past `Created`.
    TryStart(DateTime<Utc>),
    /// Record completion with a terminal status.
    Finish {
        /// Terminal status.
        status: VersionStatus,
        /// Completion time.
        at: DateTime<Utc>,
    },
}

/// Start/finish bookkeeping common to versions and patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    status: VersionStatus,
    start_time: Option<DateTime<Utc>>,
    finish_time: Option<DateTime<Utc>>,
}

impl Progress {
    const fn created() -> Self {
        Self {
            status: VersionStatus::Created,
            start_time: None,
            finish_time: None,
        }
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> VersionStatus {
        self.status
    }

    /// Returns the start time.
    #[must_use]
    pub const fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Returns the finish time.
    #[must_use]
    pub const fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.finish_time
    }

    /// Applies `update`, returning whether anything changed.
    ///
    /// Finishing twice with the same status keeps the first finish time.
    pub fn apply(&mut self, update: ProgressUpdate) -> bool {
        match update {
            ProgressUpdate::TryStart(at) => {
                if self.status != VersionStatus::Created {
                    return false;
                }
                self.status = VersionStatus::Started;
                self.start_time = Some(at);
                true
            }
            ProgressUpdate::Finish { status, at } => {
                if self.status == status && self.finish_time.is_some() {
                    return false;
                }
                self.status = status;
                self.finish_time = Some(at);
                true
            }
        }
    }
}

/// One invocation of the whole pipeline for one commit or patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    id: VersionId,
    project: ProjectId,
    requester: Requester,
    progress: Progress,
}

impl Version {
    /// Creates a mainline version in the `Created` state.
    #[must_use]
    pub fn new(project: ProjectId) -> Self {
        Self {
            id: VersionId::new(),
            project,
            requester: Requester::Mainline,
            progress: Progress::created(),
        }
    }

    /// Overrides the generated identifier.
    #[must_use]
    pub const fn with_id(mut self, id: VersionId) -> Self {
        self.id = id;
        self
    }

    /// Sets the requester kind.
    #[must_use]
    pub const fn with_requester(mut self, requester: Requester) -> Self {
        self.requester = requester;
        self
    }

    /// Returns the version identifier.
    #[must_use]
    pub const fn id(&self) -> VersionId {
        self.id
    }

    /// Returns the project.
    #[must_use]
    pub const fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Returns the requester kind.
    #[must_use]
    pub const fn requester(&self) -> Requester {
        self.requester
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> VersionStatus {
        self.progress.status
    }

    /// Returns start/finish bookkeeping.
    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Applies a progress update, returning whether anything changed.
    pub fn apply(&mut self, update: ProgressUpdate) -> bool {
        self.progress.apply(update)
    }
}

/// A user-submitted, non-mainline run wrapping one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    version_id: VersionId,
    author: String,
    description: String,
    progress: Progress,
}

impl Patch {
    /// Creates a patch wrapping `version_id`.
    #[must_use]
    pub fn new(version_id: VersionId, author: impl Into<String>) -> Self {
        Self {
            version_id,
            author: author.into(),
            description: String::new(),
            progress: Progress::created(),
        }
    }

    /// Sets the patch description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the wrapped version.
    #[must_use]
    pub const fn version_id(&self) -> VersionId {
        self.version_id
    }

    /// Returns the submitting user.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> VersionStatus {
        self.progress.status
    }

    /// Returns start/finish bookkeeping.
    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Applies a progress update, returning whether anything changed.
    pub fn apply(&mut self, update: ProgressUpdate) -> bool {
        self.progress.apply(update)
    }
}
