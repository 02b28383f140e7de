//! Engine-wide policy constants.

use super::ActorId;
use serde::Deserialize;

/// Policy constants for the lifecycle engine.
///
/// Passed to the service at construction instead of living in globals.
///
/// # Examples
///
/// ```
/// use stepback::lifecycle::domain::{ActorId, LifecycleConfig};
///
/// let config = LifecycleConfig::default();
/// assert_eq!(config.max_task_execution, 3);
/// assert!(config.is_system_activator(&ActorId::new("scheduler")));
/// assert!(!config.is_system_activator(&ActorId::new("alice")));
///
/// let tuned: LifecycleConfig =
///     serde_json::from_str(r#"{ "max_task_execution": 5 }"#).expect("valid config");
/// assert_eq!(tuned.max_task_execution, 5);
/// assert_eq!(tuned.push_stage, "push");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Executions after which automatic resets finalize the task instead.
    pub max_task_execution: u32,
    /// Actors treated as privileged automated activators.
    pub system_activators: Vec<ActorId>,
    /// Actor used when stepback activates a previous task.
    pub stepback_activator: ActorId,
    /// Origin identifier of UI-initiated requests.
    pub ui_origin: String,
    /// Display name of the compile stage.
    pub compile_stage: String,
    /// Display name of the push stage.
    pub push_stage: String,
    /// Unfinished tasks tolerated when deciding whether a build resolves.
    pub resolution_slack: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_task_execution: 3,
            system_activators: vec![ActorId::new("scheduler"), ActorId::new("apiserver")],
            stepback_activator: ActorId::new("stepback"),
            ui_origin: "ui".to_owned(),
            compile_stage: "compile".to_owned(),
            push_stage: "push".to_owned(),
            resolution_slack: 1,
        }
    }
}

impl LifecycleConfig {
    /// Returns `true` for privileged automated activators.
    #[must_use]
    pub fn is_system_activator(&self, actor: &ActorId) -> bool {
        self.system_activators.contains(actor)
    }

    /// Returns `true` when `origin` identifies the UI.
    #[must_use]
    pub fn is_ui_origin(&self, origin: &str) -> bool {
        self.ui_origin == origin
    }

    /// Returns `true` for the compile stage.
    #[must_use]
    pub fn is_compile_stage(&self, display_name: &str) -> bool {
        self.compile_stage == display_name
    }

    /// Returns `true` for the push stage.
    #[must_use]
    pub fn is_push_stage(&self, display_name: &str) -> bool {
        self.push_stage == display_name
    }
}
