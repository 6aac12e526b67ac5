//! Generator configuration file.
//!
//! The configuration is a single YAML document with an optional `workflow`
//! section and a required `targets` section:
//!
//! ```yaml
//! workflow:
//!   name: Build and Publish Nightly Packages
//!   subdist: nightly
//!   max_parallel: 4
//! targets:
//!   linux:
//!     - { name: centos-7, platform: centos, platform_version: 7 }
//!   macos:
//!     - { name: macos-x86_64, platform: macos, platform_version: x86_64, family: generic }
//! ```
//!
//! Unknown keys are rejected everywhere so that a typo never silently falls
//! back to a default.

use crate::error::{Error, Result};
use crate::target::{OsGroup, TargetSet};
use crate::validation::ConfigValidator;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file looked up when no configuration path is given
pub const DEFAULT_CONFIG_PATH: &str = ".github/nightly.targets.yml";

/// Complete generator input: workflow settings plus the target matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Workflow-level settings
    #[serde(default)]
    pub workflow: WorkflowSettings,

    /// Targets to build, grouped by OS
    pub targets: TargetSet,
}

impl GeneratorConfig {
    /// Create a configuration with default settings for the given targets
    #[must_use]
    pub fn new(targets: TargetSet) -> Self {
        Self {
            workflow: WorkflowSettings::default(),
            targets,
        }
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML for this
    /// schema, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::from_path(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read,
    /// [`Error::Configuration`] when it holds no YAML content and
    /// [`Error::Parse`] when it does not match the schema.
    pub fn from_path(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Reading generator configuration");
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        let source_name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Self::parse(&text, &source_name)
    }

    /// Parse a configuration from YAML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an empty document and
    /// [`Error::Parse`] naming the failing field otherwise.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, source_name: &str) -> Result<Self> {
        if is_blank_document(text) {
            return Err(Error::configuration_with_help(
                format!("{source_name} contains no targets"),
                "Declare at least one entry under `targets.linux` or `targets.macos`",
            ));
        }

        let deserializer = serde_yaml::Deserializer::from_str(text);
        let config: Self = serde_path_to_error::deserialize(deserializer).map_err(|err| {
            let field = err.path().to_string();
            Error::parse(source_name, field, err.into_inner().to_string())
        })?;

        tracing::debug!(
            source = source_name,
            linux = config.targets.linux.len(),
            macos = config.targets.macos.len(),
            "Parsed generator configuration"
        );
        Ok(config)
    }

    /// Validate the configuration, reporting every problem at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with all collected problems.
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::new(self).validate().map_err(Error::Validation)
    }
}

/// True when `text` has nothing but whitespace and comments.
fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Workflow-level settings shared by every rendered job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowSettings {
    /// Workflow name displayed by the CI provider
    pub name: String,

    /// Package identifier handed to the build tooling (`PACKAGE`)
    pub package: String,

    /// Package revision (`PKG_REVISION`), passed through verbatim
    pub revision: String,

    /// Sub-distribution channel (`PKG_SUBDIST`); empty omits the variable
    pub subdist: String,

    /// Emit `EXTRA_OPTIMIZATIONS` on build steps
    pub extra_optimizations: bool,

    /// Upper bound on concurrently running matrix jobs
    pub max_parallel: u32,

    /// Runner labels per OS group
    pub runners: Runners,

    /// Location of the external packaging tooling
    pub tooling: Tooling,

    /// Events that start the workflow
    pub triggers: Triggers,

    /// Credentials handed to the upload tooling.
    ///
    /// Values written as `${NAME}` are rendered as provider secret references,
    /// anything else is emitted verbatim.
    pub upload_env: IndexMap<String, String>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        let mut upload_env = IndexMap::new();
        upload_env.insert(
            "PACKAGE_UPLOAD_SSH_KEY".to_string(),
            "${PACKAGE_UPLOAD_SSH_KEY}".to_string(),
        );

        Self {
            name: "Build and Publish Nightly Packages".to_string(),
            package: "edgedbpkg.edgedbcli:EdgeDBCLI".to_string(),
            revision: "<current-date>".to_string(),
            subdist: "nightly".to_string(),
            extra_optimizations: true,
            max_parallel: 4,
            runners: Runners::default(),
            tooling: Tooling::default(),
            triggers: Triggers::default(),
            upload_env,
        }
    }
}

impl WorkflowSettings {
    /// Sub-distribution, `None` when empty
    #[must_use]
    pub fn subdist(&self) -> Option<&str> {
        if self.subdist.is_empty() {
            None
        } else {
            Some(&self.subdist)
        }
    }
}

/// Runner labels per OS group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Runners {
    /// Runner for Linux jobs
    pub linux: String,
    /// Runner for macOS jobs
    pub macos: String,
}

impl Default for Runners {
    fn default() -> Self {
        Self {
            linux: OsGroup::Linux.default_runner().to_string(),
            macos: OsGroup::Macos.default_runner().to_string(),
        }
    }
}

impl Runners {
    /// Runner label for a group
    #[must_use]
    pub fn for_group(&self, group: OsGroup) -> &str {
        match group {
            OsGroup::Linux => &self.linux,
            OsGroup::Macos => &self.macos,
        }
    }
}

/// Repository holding the per-platform build and upload tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tooling {
    /// `owner/name` of the tooling repository
    pub repository: String,

    /// Git ref of the tooling to use
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Checkout path of the tooling inside the workspace
    pub path: String,
}

impl Default for Tooling {
    fn default() -> Self {
        Self {
            repository: "edgedb/edgedb-pkg".to_string(),
            git_ref: "master".to_string(),
            path: "edgedb-pkg".to_string(),
        }
    }
}

/// Workflow trigger settings. Empty lists disable the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Triggers {
    /// Cron expressions
    pub schedule: Vec<String>,

    /// Branches whose pushes start a run
    pub branches: Vec<String>,

    /// `repository_dispatch` event types
    pub repository_dispatch: Vec<String>,

    /// Allow manual runs
    pub workflow_dispatch: bool,
}

impl Default for Triggers {
    fn default() -> Self {
        Self {
            schedule: vec!["0 0 * * *".to_string()],
            branches: vec!["nightly".to_string()],
            repository_dispatch: Vec::new(),
            workflow_dispatch: true,
        }
    }
}

impl Triggers {
    /// Whether any trigger is enabled
    #[must_use]
    pub fn any(&self) -> bool {
        !self.schedule.is_empty()
            || !self.branches.is_empty()
            || !self.repository_dispatch.is_empty()
            || self.workflow_dispatch
    }
}
