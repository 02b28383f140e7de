//! Project-level settings consulted by the stepback policy.

use super::ProjectId;
use serde::{Deserialize, Serialize};

/// Stepback override for one build variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSettings {
    /// Build variant name.
    pub name: String,
    /// Stepback override, if set.
    #[serde(default)]
    pub stepback: Option<bool>,
}

/// Stepback override for one task, matched by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTaskSettings {
    /// Task display name.
    pub name: String,
    /// Stepback override, if set.
    #[serde(default)]
    pub stepback: Option<bool>,
}

/// The slice of project configuration the lifecycle engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Project identifier.
    pub id: ProjectId,
    /// Project-wide stepback default.
    #[serde(default)]
    pub stepback: bool,
    /// Per-variant overrides.
    #[serde(default)]
    pub build_variants: Vec<VariantSettings>,
    /// Per-task overrides.
    #[serde(default)]
    pub tasks: Vec<ProjectTaskSettings>,
}

impl ProjectSettings {
    /// Creates settings with the given project-wide stepback default.
    #[must_use]
    pub const fn new(id: ProjectId, stepback: bool) -> Self {
        Self {
            id,
            stepback,
            build_variants: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Adds a build-variant entry.
    #[must_use]
    pub fn with_variant(mut self, name: impl Into<String>, stepback: Option<bool>) -> Self {
        self.build_variants.push(VariantSettings {
            name: name.into(),
            stepback,
        });
        self
    }

    /// Adds a task entry.
    #[must_use]
    pub fn with_task(mut self, name: impl Into<String>, stepback: Option<bool>) -> Self {
        self.tasks.push(ProjectTaskSettings {
            name: name.into(),
            stepback,
        });
        self
    }

    /// Resolves the effective stepback policy for a task.
    ///
    /// Precedence: task override, then build-variant override, then the
    /// project default.
    #[must_use]
    pub fn stepback_for(&self, display_name: &str, build_variant: &str) -> bool {
        let task_override = self
            .tasks
            .iter()
            .find(|task| task.name == display_name)
            .and_then(|task| task.stepback);
        let variant_override = self
            .build_variants
            .iter()
            .find(|variant| variant.name == build_variant)
            .and_then(|variant| variant.stepback);
        task_override.or(variant_override).unwrap_or(self.stepback)
    }
}
