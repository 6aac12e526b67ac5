//! GitHub Actions Workflow Schema Types
//!
//! Defines the data structures for GitHub Actions workflow YAML generation.
//! Every map is an [`IndexMap`] so serialization order follows insertion order
//! and rendering is byte-for-byte reproducible.
//! See: <https://docs.github.com/en/actions/using-workflows/workflow-syntax-for-github-actions>

use indexmap::IndexMap;
use serde::Serialize;

/// A GitHub Actions workflow definition.
///
/// Represents the complete structure of a workflow file that can be committed
/// to `.github/workflows/`.
#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    /// Workflow name displayed in GitHub UI
    pub name: String,

    /// Trigger configuration
    #[serde(rename = "on")]
    pub on: WorkflowTriggers,

    /// Concurrency settings to prevent overlapping runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,

    /// Default permissions for `GITHUB_TOKEN`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,

    /// Job definitions (order preserved via `IndexMap`)
    pub jobs: IndexMap<String, Job>,
}

/// Workflow trigger configuration.
///
/// Defines when the workflow should run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowTriggers {
    /// Trigger on push events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<PushTrigger>,

    /// Scheduled trigger (cron expressions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleTrigger>>,

    /// Trigger on `repository_dispatch` API events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_dispatch: Option<RepositoryDispatchTrigger>,

    /// Manual trigger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_dispatch: Option<WorkflowDispatchTrigger>,
}

/// Push event trigger configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushTrigger {
    /// Branch patterns to trigger on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
}

/// Schedule trigger using cron expressions.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleTrigger {
    /// Cron expression (e.g., "0 0 * * *" for daily at midnight)
    pub cron: String,
}

/// `repository_dispatch` trigger configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepositoryDispatchTrigger {
    /// Event types to accept
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

/// Manual workflow dispatch trigger. Renders as an empty mapping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowDispatchTrigger {}

/// Concurrency configuration to prevent duplicate workflow runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Concurrency {
    /// Concurrency group name (use expressions like `${{ github.workflow }}`)
    pub group: String,

    /// Whether to cancel in-progress runs when a new run is triggered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_in_progress: Option<bool>,
}

/// `GITHUB_TOKEN` permissions configuration.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Permissions {
    /// Repository contents permission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<PermissionLevel>,
}

/// Permission level for `GITHUB_TOKEN` scopes.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Read-only access
    Read,
}

/// A job in a GitHub Actions workflow.
///
/// Jobs run in parallel by default unless `needs` dependencies are specified.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    /// Job display name (shown in GitHub UI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Runner label specifying where to run
    pub runs_on: String,

    /// Job dependencies (these jobs must complete first)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,

    /// Matrix strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    /// Job steps (executed sequentially)
    pub steps: Vec<Step>,
}

/// Matrix strategy of a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Strategy {
    /// Cancel sibling matrix jobs when one fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,

    /// Upper bound on concurrently running matrix jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<u32>,

    /// Matrix axes
    pub matrix: Matrix,
}

/// Matrix axes, rendered as `axis: [values]` entries in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Matrix {
    /// Axis name to the values it enumerates
    #[serde(flatten)]
    pub axes: IndexMap<String, Vec<String>>,
}

impl Matrix {
    /// Create a matrix with a single axis
    #[must_use]
    pub fn single(axis: impl Into<String>, values: Vec<String>) -> Self {
        let mut axes = IndexMap::new();
        axes.insert(axis.into(), values);
        Self { axes }
    }

    /// Values of an axis
    #[must_use]
    pub fn axis(&self, name: &str) -> Option<&[String]> {
        self.axes.get(name).map(Vec::as_slice)
    }
}

/// A step in a job.
///
/// Steps can either `uses` an action or `run` a shell command.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    /// Step display name (shown in GitHub UI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Conditional execution expression
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_condition: Option<String>,

    /// Action to use (e.g., "actions/checkout@v4")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    /// Shell command(s) to run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    /// Action inputs (for `uses` steps)
    #[serde(rename = "with", skip_serializing_if = "IndexMap::is_empty")]
    pub with_inputs: IndexMap<String, serde_yaml::Value>,

    /// Step environment variables
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
}

impl Step {
    /// Create a step that uses an action
    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    /// Create a step that runs a shell command
    pub fn run(command: impl Into<String>) -> Self {
        Self {
            run: Some(command.into()),
            ..Default::default()
        }
    }

    /// Set the step name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a with input
    #[must_use]
    pub fn with_input(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_yaml::Value>,
    ) -> Self {
        self.with_inputs.insert(key.into(), value.into());
        self
    }

    /// Replace all environment variables
    #[must_use]
    pub fn with_env_map(mut self, env: IndexMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Set a condition
    #[must_use]
    pub fn with_if(mut self, condition: impl Into<String>) -> Self {
        self.if_condition = Some(condition.into());
        self
    }
}
