//! Predicates for finding tasks.

use super::{BuildId, ProjectId, Requester, Task, TaskStatus};

/// The revision history a task belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryScope {
    /// Project.
    pub project: ProjectId,
    /// Build variant.
    pub build_variant: String,
    /// Task display name.
    pub display_name: String,
}

impl HistoryScope {
    /// Returns the history scope of `task`.
    #[must_use]
    pub fn of(task: &Task) -> Self {
        Self {
            project: task.project().clone(),
            build_variant: task.build_variant().to_owned(),
            display_name: task.display_name().to_owned(),
        }
    }

    fn contains(&self, task: &Task) -> bool {
        task.project() == &self.project
            && task.build_variant() == self.build_variant
            && task.display_name() == self.display_name
    }
}

/// Earlier revisions of a task, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    scope: HistoryScope,
    before_revision: u64,
    requester: Option<Requester>,
    statuses: Vec<TaskStatus>,
    activated_only: bool,
    limit: Option<usize>,
}

impl HistoryQuery {
    /// Matches tasks in the same scope as `task` at strictly earlier revisions.
    #[must_use]
    pub fn before(task: &Task) -> Self {
        Self {
            scope: HistoryScope::of(task),
            before_revision: task.revision_order(),
            requester: None,
            statuses: Vec::new(),
            activated_only: false,
            limit: None,
        }
    }

    /// Restricts matches to one requester kind.
    #[must_use]
    pub const fn with_requester(mut self, requester: Requester) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Restricts matches to the given statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Restricts matches to active tasks.
    #[must_use]
    pub const fn activated_only(mut self) -> Self {
        self.activated_only = true;
        self
    }

    /// Keeps only the newest `limit` matches.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the scope searched.
    #[must_use]
    pub const fn scope(&self) -> &HistoryScope {
        &self.scope
    }

    /// Returns the exclusive upper revision bound.
    #[must_use]
    pub const fn before_revision(&self) -> u64 {
        self.before_revision
    }

    /// Returns the maximum number of matches.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns `true` if `task` satisfies every restriction.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.scope.contains(task)
            && task.revision_order() < self.before_revision
            && self.requester.is_none_or(|requester| task.requester() == requester)
            && (self.statuses.is_empty() || self.statuses.contains(&task.status()))
            && (!self.activated_only || task.is_active())
    }
}

/// Predicate for multi-task lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskQuery {
    /// Every task of a build.
    ByBuild(BuildId),
    /// Earlier revisions of a task, newest first.
    History(HistoryQuery),
}

impl TaskQuery {
    /// Returns `true` if `task` satisfies the predicate.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::ByBuild(build_id) => task.build_id() == *build_id,
            Self::History(history) => history.matches(task),
        }
    }
}
