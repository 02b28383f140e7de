//! Roll-up of child task statuses into a build status.

use super::{BuildStatus, LifecycleConfig, Task, TaskStatus};

/// What a recomputation pass decided for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildResolution {
    /// No task has finished; the build goes back to `Created`.
    NotStarted,
    /// Too many tasks are outstanding to resolve; carries the interim status.
    Unfinished(BuildStatus),
    /// Everything else passed but the push stage has not completed yet.
    AwaitingPush,
    /// The build resolves with the given terminal status.
    Resolved(BuildStatus),
}

/// Counts gathered from one scan over a build's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTally {
    total: usize,
    finished: usize,
    failed: bool,
    compile_failed: bool,
    push_exists: bool,
    push_completed: bool,
    push_succeeded: bool,
}

impl BuildTally {
    /// Scans `tasks`, treating compile and push stages specially.
    ///
    /// A failed compile stops the scan: remaining results are moot. A failed
    /// push or ordinary task is noted and the scan continues.
    #[must_use]
    pub fn from_tasks(tasks: &[Task], config: &LifecycleConfig) -> Self {
        let mut tally = Self {
            total: tasks.len(),
            finished: 0,
            failed: false,
            compile_failed: false,
            push_exists: tasks
                .iter()
                .any(|task| config.is_push_stage(task.display_name())),
            push_completed: false,
            push_succeeded: true,
        };

        for task in tasks.iter().filter(|task| task.is_finished()) {
            tally.finished += 1;
            let succeeded = task.status() == TaskStatus::Succeeded;
            if config.is_compile_stage(task.display_name()) {
                if !succeeded {
                    tally.failed = true;
                    tally.compile_failed = true;
                    break;
                }
            } else if config.is_push_stage(task.display_name()) {
                tally.push_completed = true;
                if !succeeded {
                    tally.push_succeeded = false;
                }
            } else if !succeeded {
                tally.failed = true;
            }
        }
        tally
    }

    /// Returns the number of tasks scanned.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns the number of finished tasks seen before the scan stopped.
    #[must_use]
    pub const fn finished(&self) -> usize {
        self.finished
    }

    /// Returns `true` if a compile or ordinary task failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        self.failed
    }

    /// Decides the build's fate.
    ///
    /// The build resolves once at most `slack` tasks are still outstanding.
    #[must_use]
    pub const fn resolution(&self, slack: usize) -> BuildResolution {
        if self.compile_failed {
            return BuildResolution::Resolved(BuildStatus::Failed);
        }
        if self.finished == 0 {
            return BuildResolution::NotStarted;
        }
        if self.finished.saturating_add(slack) < self.total {
            let interim = if self.failed || !self.push_succeeded {
                BuildStatus::Failed
            } else {
                BuildStatus::Started
            };
            return BuildResolution::Unfinished(interim);
        }
        if self.failed {
            return BuildResolution::Resolved(BuildStatus::Failed);
        }
        if !self.push_exists {
            return BuildResolution::Resolved(BuildStatus::Succeeded);
        }
        match (self.push_completed, self.push_succeeded) {
            (true, true) => BuildResolution::Resolved(BuildStatus::Succeeded),
            (true, false) => BuildResolution::Resolved(BuildStatus::Failed),
            (false, _) => BuildResolution::AwaitingPush,
        }
    }
}
