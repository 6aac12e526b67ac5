//! `pkgmatrix check`: fail when the committed workflow has drifted.
//!
//! Nothing is written; a stale or missing workflow maps to exit code 1.

use crate::cli::{CliError, ConfigArgs};
use crate::output::{Drift, detect_drift};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::instrument;

/// Result of a successful `pkgmatrix check`
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Workflow file that was compared
    pub output: String,
    /// Always [`Drift::UpToDate`]; drift is reported as an error
    pub drift: Drift,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} is up to date", self.output)
    }
}

/// Compare the workflow at `output` with a fresh render.
#[instrument(name = "check", skip(config), fields(config = %config.path.display()))]
pub fn execute(config: &ConfigArgs, output: &Path) -> Result<CheckReport, CliError> {
    let generator_config = super::load_config(config)?;
    let content = super::render_workflow(&config.path, &generator_config)?;

    let help = format!(
        "Run `pkgmatrix generate -c {} -o {}` and commit the result",
        config.path.display(),
        output.display()
    );
    match detect_drift(output, &content)? {
        Drift::UpToDate => Ok(CheckReport {
            output: output.display().to_string(),
            drift: Drift::UpToDate,
        }),
        Drift::Stale => {
            tracing::warn!(output = %output.display(), "Workflow differs from a fresh render");
            Err(CliError::drift_with_help(
                format!(
                    "{} differs from a fresh render of {}",
                    output.display(),
                    config.path.display()
                ),
                help,
            ))
        }
        Drift::Missing => Err(CliError::drift_with_help(
            format!("{} does not exist", output.display()),
            help,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::generate;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ConfigArgs) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nightly.targets.yml");
        std::fs::write(
            &path,
            concat!(
                "targets:\n  macos:\n",
                "    - { name: macos-arm64, platform: macos,",
                " platform_version: arm64, family: generic }\n",
            ),
        )
        .unwrap();
        (dir, ConfigArgs { path })
    }

    #[test]
    fn test_check_after_generate_passes() {
        let (dir, config) = setup();
        let output = dir.path().join("nightly.yml");
        generate::execute(&config, &output, false).unwrap();

        let report = execute(&config, &output).unwrap();
        assert_eq!(report.drift, Drift::UpToDate);
    }

    #[test]
    fn test_check_detects_edits() {
        let (dir, config) = setup();
        let output = dir.path().join("nightly.yml");
        generate::execute(&config, &output, false).unwrap();

        let mut content = std::fs::read_to_string(&output).unwrap();
        content.push_str("# local edit\n");
        std::fs::write(&output, content).unwrap();

        let err = execute(&config, &output).unwrap_err();
        assert!(matches!(err, CliError::Drift { .. }));
    }

    #[test]
    fn test_check_missing_workflow_is_drift() {
        let (dir, config) = setup();
        let err = execute(&config, &dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, CliError::Drift { .. }));
        assert!(err.to_string().contains("does not exist"));
    }
}
