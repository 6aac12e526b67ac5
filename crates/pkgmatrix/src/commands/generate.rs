//! `pkgmatrix generate`: render the workflow and write it atomically.

use crate::cli::{CliError, ConfigArgs};
use crate::output::{FileStatus, write_workflow};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::instrument;

/// Output path meaning "print to stdout"
pub const STDOUT: &str = "-";

/// Result of `pkgmatrix generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    /// Target file that was read
    pub config: String,
    /// Workflow file, absent when printing to stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// What happened to the workflow file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
    /// Number of targets rendered
    pub targets: usize,
    /// Rendered workflow when printing to stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl fmt::Display for GenerateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(content) = &self.content {
            return f.write_str(content);
        }
        match (&self.status, &self.output) {
            (Some(status), Some(output)) => {
                writeln!(f, "{status} {output} ({} targets)", self.targets)
            }
            _ => Ok(()),
        }
    }
}

/// Render the workflow and write it to `output`, or return it when `output` is `-`.
#[instrument(name = "generate", skip(config), fields(config = %config.path.display()))]
pub fn execute(
    config: &ConfigArgs,
    output: &Path,
    dry_run: bool,
) -> Result<GenerateReport, CliError> {
    let generator_config = super::load_config(config)?;
    let content = super::render_workflow(&config.path, &generator_config)?;
    let targets = generator_config.targets.len();

    if output.as_os_str() == STDOUT {
        return Ok(GenerateReport {
            config: config.path.display().to_string(),
            output: None,
            status: None,
            targets,
            content: Some(content),
        });
    }

    let status = write_workflow(output, &content, dry_run)?;
    Ok(GenerateReport {
        config: config.path.display().to_string(),
        output: Some(output.display().to_string()),
        status: Some(status),
        targets,
        content: None,
    })
}
