//! GitHub Actions Workflow Emitter
//!
//! Transforms a pkgmatrix configuration into a GitHub Actions workflow.

use crate::workflow::schema::{
    Concurrency, Job, Matrix, PermissionLevel, Permissions, PushTrigger,
    RepositoryDispatchTrigger, ScheduleTrigger, Step, Strategy, Workflow,
    WorkflowDispatchTrigger, WorkflowTriggers,
};
use crate::workflow::target_renderer::TargetStepRenderer;
use indexmap::IndexMap;
use pkgmatrix_core::{
    Emitter, EmitterError, EmitterResult, GeneratorConfig, OsGroup, Target, Triggers,
    WorkflowSettings,
};

/// Matrix axis enumerating target names
pub const MATRIX_AXIS: &str = "target";

/// Artifact name shared by the upload and download steps
pub const ARTIFACT_NAME: &str = "builds-${{ matrix.target }}";

/// Artifact directory shared by the build tooling and the upload/download steps
pub const ARTIFACT_PATH: &str = "artifacts/${{ matrix.target }}";

const CHECKOUT_ACTION: &str = "actions/checkout@v4";
const UPLOAD_ARTIFACT_ACTION: &str = "actions/upload-artifact@v4";
const DOWNLOAD_ARTIFACT_ACTION: &str = "actions/download-artifact@v4";

/// GitHub Actions workflow emitter
///
/// # Configuration to GitHub Actions Mapping
///
/// | Configuration | GitHub Actions |
/// |---------------|----------------|
/// | `workflow.name` | Workflow `name:` |
/// | `workflow.triggers` | `on.*` trigger entries |
/// | non-empty `targets.<group>` | Jobs `build-<group>` and `publish-<group>` |
/// | `target.name` | `strategy.matrix.target` entry and step `if:` |
/// | `workflow.max_parallel` | `strategy.max-parallel` |
/// | `workflow.runners.<group>` | `runs-on:` |
/// | `workflow.upload_env` | Publish step `env:` (`${NAME}` becomes a secret reference) |
#[derive(Debug, Clone)]
pub struct GitHubActionsEmitter {
    /// Configuration file name recorded in the generation header
    pub source_name: Option<String>,
    /// Command recorded in the generation header
    pub regenerate_command: String,
}

impl Default for GitHubActionsEmitter {
    fn default() -> Self {
        Self {
            source_name: None,
            regenerate_command: "pkgmatrix generate".to_string(),
        }
    }
}

impl GitHubActionsEmitter {
    /// Create a new GitHub Actions emitter with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the configuration file name in the generation header
    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Set the regenerate command shown in the generation header
    #[must_use]
    pub fn with_regenerate_command(mut self, command: impl Into<String>) -> Self {
        self.regenerate_command = command.into();
        self
    }

    /// Build the workflow document.
    ///
    /// Groups without targets contribute no jobs. The configuration is
    /// expected to be valid; use [`Emitter::emit`] to validate first.
    #[must_use]
    pub fn build_workflow(&self, config: &GeneratorConfig) -> Workflow {
        let settings = &config.workflow;
        let mut jobs = IndexMap::new();

        for (group, targets) in config.targets.groups() {
            tracing::debug!(
                group = %group,
                targets = targets.len(),
                "Rendering build and publish jobs"
            );
            jobs.insert(
                group.build_job_id(),
                Self::build_build_job(settings, group, targets),
            );
            jobs.insert(
                group.publish_job_id(),
                Self::build_publish_job(settings, group, targets),
            );
        }

        Workflow {
            name: settings.name.clone(),
            on: Self::build_triggers(&settings.triggers),
            concurrency: Some(Concurrency {
                group: "${{ github.workflow }}-${{ github.ref }}".to_string(),
                cancel_in_progress: Some(false),
            }),
            permissions: Some(Permissions {
                contents: Some(PermissionLevel::Read),
            }),
            jobs,
        }
    }

    /// Build workflow triggers, leaving out the disabled ones
    fn build_triggers(triggers: &Triggers) -> WorkflowTriggers {
        WorkflowTriggers {
            push: (!triggers.branches.is_empty()).then(|| PushTrigger {
                branches: triggers.branches.clone(),
            }),
            schedule: (!triggers.schedule.is_empty()).then(|| {
                triggers
                    .schedule
                    .iter()
                    .map(|cron| ScheduleTrigger { cron: cron.clone() })
                    .collect()
            }),
            repository_dispatch: (!triggers.repository_dispatch.is_empty()).then(|| {
                RepositoryDispatchTrigger {
                    types: triggers.repository_dispatch.clone(),
                }
            }),
            workflow_dispatch: triggers
                .workflow_dispatch
                .then(WorkflowDispatchTrigger::default),
        }
    }

    /// Strategy enumerating target names in declaration order
    #[must_use]
    pub fn matrix_strategy(settings: &WorkflowSettings, targets: &[Target]) -> Strategy {
        Strategy {
            fail_fast: Some(false),
            max_parallel: Some(settings.max_parallel),
            matrix: Matrix::single(
                MATRIX_AXIS,
                targets.iter().map(|t| t.name.clone()).collect(),
            ),
        }
    }

    fn checkout_tooling_step(settings: &WorkflowSettings) -> Step {
        let tooling = &settings.tooling;
        Step::uses(CHECKOUT_ACTION)
            .with_name("Checkout packaging tooling")
            .with_input("repository", tooling.repository.clone())
            .with_input("ref", tooling.git_ref.clone())
            .with_input("path", tooling.path.clone())
    }

    /// Build job: checkout, one conditional build step per target, artifact upload.
    #[must_use]
    pub fn build_build_job(settings: &WorkflowSettings, group: OsGroup, targets: &[Target]) -> Job {
        let renderer = TargetStepRenderer::new(settings);
        let mut steps = Vec::with_capacity(targets.len() + 3);

        steps.push(Step::uses(CHECKOUT_ACTION).with_name("Checkout"));
        steps.push(Self::checkout_tooling_step(settings));
        steps.extend(targets.iter().map(|target| renderer.build_step(group, target)));
        steps.push(
            Step::uses(UPLOAD_ARTIFACT_ACTION)
                .with_name("Upload artifacts")
                .with_input("name", ARTIFACT_NAME)
                .with_input("path", ARTIFACT_PATH)
                .with_input("if-no-files-found", "error"),
        );

        Job {
            name: Some(format!("Build {group} (${{{{ matrix.target }}}})")),
            runs_on: settings.runners.for_group(group).to_string(),
            needs: Vec::new(),
            strategy: Some(Self::matrix_strategy(settings, targets)),
            steps,
        }
    }

    /// Publish job: depends on the build job of the same group, downloads the
    /// artifact of the current matrix target, then one conditional upload step
    /// per target.
    #[must_use]
    pub fn build_publish_job(
        settings: &WorkflowSettings,
        group: OsGroup,
        targets: &[Target],
    ) -> Job {
        let renderer = TargetStepRenderer::new(settings);
        let mut steps = Vec::with_capacity(targets.len() + 2);

        // The macOS publish script lives in the tooling checkout
        if group == OsGroup::Macos {
            steps.push(Self::checkout_tooling_step(settings));
        }
        steps.push(
            Step::uses(DOWNLOAD_ARTIFACT_ACTION)
                .with_name("Download artifacts")
                .with_input("name", ARTIFACT_NAME)
                .with_input("path", ARTIFACT_PATH),
        );
        steps.extend(
            targets
                .iter()
                .map(|target| renderer.publish_step(group, target)),
        );

        Job {
            name: Some(format!("Publish {group} (${{{{ matrix.target }}}})")),
            runs_on: settings.runners.for_group(group).to_string(),
            needs: vec![group.build_job_id()],
            strategy: Some(Self::matrix_strategy(settings, targets)),
            steps,
        }
    }

    /// Generation header placed above the YAML document
    #[must_use]
    pub fn header(&self) -> String {
        let source = self
            .source_name
            .as_deref()
            .map_or_else(String::new, |name| format!(" from {name}"));
        format!(
            "# Generated by pkgmatrix{source} - do not edit manually\n# Regenerate with: {}\n\n",
            self.regenerate_command
        )
    }

    /// Serialize a workflow to YAML with the generation header
    ///
    /// # Errors
    ///
    /// Returns `EmitterError::Serialization` if YAML serialization fails.
    pub fn serialize_workflow(&self, workflow: &Workflow) -> EmitterResult<String> {
        let yaml = serde_yaml::to_string(workflow)
            .map_err(|e| EmitterError::Serialization(e.to_string()))?;
        Ok(format!("{}{yaml}", self.header()))
    }
}

impl Emitter for GitHubActionsEmitter {
    fn render(&self, config: &GeneratorConfig) -> EmitterResult<String> {
        let workflow = self.build_workflow(config);
        self.serialize_workflow(&workflow)
    }

    fn format_name(&self) -> &'static str {
        "github"
    }

    fn file_extension(&self) -> &'static str {
        "yml"
    }

    fn description(&self) -> &'static str {
        "GitHub Actions workflow YAML emitter"
    }
}
