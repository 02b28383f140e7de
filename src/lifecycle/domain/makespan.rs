//! Makespan calculations over a build's task set.

use super::{Makespans, Task, TaskId};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

impl Makespans {
    /// Computes predicted and actual makespans for `tasks`.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            predicted: predicted_makespan(tasks),
            actual: actual_makespan(tasks),
        }
    }
}

/// Longest dependency chain through `tasks`, weighted by elapsed time.
///
/// Dependencies outside the slice contribute nothing. A dependency cycle is
/// cut at the first revisited task.
#[must_use]
pub fn predicted_makespan(tasks: &[Task]) -> Duration {
    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id(), task)).collect();
    let mut memo = HashMap::new();
    let mut visiting = HashSet::new();
    let mut longest = Duration::ZERO;
    for task in tasks {
        let path = critical_path(task.id(), &by_id, &mut memo, &mut visiting);
        longest = longest.max(path);
    }
    longest
}

fn critical_path(
    task_id: TaskId,
    by_id: &HashMap<TaskId, &Task>,
    memo: &mut HashMap<TaskId, Duration>,
    visiting: &mut HashSet<TaskId>,
) -> Duration {
    if let Some(known) = memo.get(&task_id) {
        return *known;
    }
    let Some(task) = by_id.get(&task_id) else {
        return Duration::ZERO;
    };
    if !visiting.insert(task_id) {
        return Duration::ZERO;
    }
    let mut longest_dependency = Duration::ZERO;
    for dependency in task.depends_on() {
        let path = critical_path(*dependency, by_id, memo, visiting);
        longest_dependency = longest_dependency.max(path);
    }
    visiting.remove(&task_id);

    let total = longest_dependency.saturating_add(task.time_taken());
    memo.insert(task_id, total);
    total
}

/// Wall-clock span from the earliest start to the latest finish.
#[must_use]
pub fn actual_makespan(tasks: &[Task]) -> Duration {
    let earliest_start = tasks.iter().filter_map(Task::start_time).min();
    let latest_finish = tasks.iter().filter_map(Task::finish_time).max();
    match (earliest_start, latest_finish) {
        (Some(start), Some(finish)) => (finish - start).to_std().unwrap_or(Duration::ZERO),
        _ => Duration::ZERO,
    }
}
