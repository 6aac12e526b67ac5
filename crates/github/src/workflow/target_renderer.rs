//! GitHub Actions target renderer.
//!
//! Turns one [`Target`] into the conditional build or publish step that runs
//! only in the matrix job for that target.

use super::schema::Step;
use indexmap::IndexMap;
use pkgmatrix_core::{OsGroup, Target, WorkflowSettings};

/// Transform CI-agnostic secret reference syntax to GitHub Actions syntax.
///
/// Converts `${VAR_NAME}` to `${{ secrets.VAR_NAME }}` for env var values
/// that are entirely a secret reference (not embedded references).
///
/// # Examples
/// - `${FOO}` -> `${{ secrets.FOO }}`
/// - `${FOO_BAR_123}` -> `${{ secrets.FOO_BAR_123 }}`
/// - `prefix-${VAR}` -> unchanged (embedded reference)
/// - `regular_value` -> unchanged
#[must_use]
pub fn transform_secret_ref(value: &str) -> String {
    let trimmed = value.trim();
    let Some(var_name) = trimmed
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    else {
        return value.to_string();
    };

    let Some(first_char) = var_name.chars().next() else {
        return value.to_string();
    };

    if !first_char.is_ascii_uppercase() {
        return value.to_string();
    }

    let is_valid_var_name = var_name
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');

    if !is_valid_var_name {
        return value.to_string();
    }

    format!("${{{{ secrets.{var_name} }}}}")
}

/// Step condition selecting the matrix job of `target`.
#[must_use]
pub fn matrix_condition(target: &Target) -> String {
    format!("matrix.target == '{}'", target.name)
}

const TRUE: &str = "true";

/// Renders per-target build and publish steps.
///
/// Environment variables are inserted in a fixed order and optional ones are
/// left out entirely rather than rendered empty.
#[derive(Debug, Clone, Copy)]
pub struct TargetStepRenderer<'a> {
    settings: &'a WorkflowSettings,
}

impl<'a> TargetStepRenderer<'a> {
    /// Create a renderer for the given workflow settings
    #[must_use]
    pub const fn new(settings: &'a WorkflowSettings) -> Self {
        Self { settings }
    }

    /// Environment handed to the build tooling
    #[must_use]
    pub fn build_env(&self, target: &Target) -> IndexMap<String, String> {
        let mut env = IndexMap::new();
        env.insert("PACKAGE".to_string(), self.settings.package.clone());
        env.insert("PKG_REVISION".to_string(), self.settings.revision.clone());
        self.insert_platform_env(&mut env, target);
        if self.settings.extra_optimizations {
            env.insert("EXTRA_OPTIMIZATIONS".to_string(), TRUE.to_string());
        }
        if target.is_generic() {
            env.insert("BUILD_GENERIC".to_string(), TRUE.to_string());
        }
        env
    }

    /// Environment handed to the upload tooling, credentials last
    #[must_use]
    pub fn publish_env(&self, target: &Target) -> IndexMap<String, String> {
        let mut env = IndexMap::new();
        self.insert_platform_env(&mut env, target);
        for (key, value) in &self.settings.upload_env {
            env.insert(key.clone(), transform_secret_ref(value));
        }
        env
    }

    fn insert_platform_env(&self, env: &mut IndexMap<String, String>, target: &Target) {
        if let Some(subdist) = self.settings.subdist() {
            env.insert("PKG_SUBDIST".to_string(), subdist.to_string());
        }
        env.insert("PKG_PLATFORM".to_string(), target.platform.clone());
        if let Some(version) = target.platform_version() {
            env.insert("PKG_PLATFORM_VERSION".to_string(), version.to_string());
        }
    }

    /// Conditional build step for one target
    #[must_use]
    pub fn build_step(&self, group: OsGroup, target: &Target) -> Step {
        let step = match group {
            OsGroup::Linux => Step::uses(self.linux_action("build", target)),
            OsGroup::Macos => Step::run(self.macos_script("build.sh")),
        };
        step.with_name(format!("Build {}", target.name))
            .with_if(matrix_condition(target))
            .with_env_map(self.build_env(target))
    }

    /// Conditional publish step for one target
    #[must_use]
    pub fn publish_step(&self, group: OsGroup, target: &Target) -> Step {
        let step = match group {
            OsGroup::Linux => Step::uses(self.linux_action("upload", target)),
            OsGroup::Macos => Step::run(self.macos_script("publish.sh")),
        };
        step.with_name(format!("Publish {}", target.name))
            .with_if(matrix_condition(target))
            .with_env_map(self.publish_env(target))
    }

    /// `<repository>/integration/linux/<stage>/<slug>@<ref>`
    fn linux_action(&self, stage: &str, target: &Target) -> String {
        let tooling = &self.settings.tooling;
        format!(
            "{}/integration/linux/{stage}/{}@{}",
            tooling.repository,
            target.slug(),
            tooling.git_ref
        )
    }

    /// `<path>/integration/macos/<script>`
    fn macos_script(&self, script: &str) -> String {
        format!("{}/integration/macos/{script}", self.settings.tooling.path)
    }
}
