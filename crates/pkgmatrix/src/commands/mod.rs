//! Subcommand implementations.
//!
//! Every command returns a report that is both [`Serialize`] (for `--json`)
//! and [`Display`] (for humans); [`execute`] picks the representation.

pub mod check;
pub mod generate;
pub mod targets;

use crate::cli::{CliError, Commands, ConfigArgs, OkEnvelope};
use pkgmatrix_core::{Emitter, GeneratorConfig};
use pkgmatrix_github::GitHubActionsEmitter;
use serde::Serialize;
use std::fmt::Display;
use std::path::Path;

/// Run a subcommand and return what should be printed on stdout.
///
/// # Errors
///
/// Returns a [`CliError`] whose variant decides the process exit code.
pub fn execute(command: Commands, json: bool) -> Result<String, CliError> {
    let span = crate::command_span!(command.name());
    let _guard = span.enter();

    match command {
        Commands::Generate {
            config,
            output,
            dry_run,
        } => format_report(&generate::execute(&config, &output, dry_run)?, json),
        Commands::Check { config, output } => {
            format_report(&check::execute(&config, &output)?, json)
        }
        Commands::Targets { config } => format_report(&targets::execute(&config)?, json),
    }
}

fn format_report<T: Serialize + Display>(report: &T, json: bool) -> Result<String, CliError> {
    if json {
        serde_json::to_string(&OkEnvelope::new(report))
            .map(|mut out| {
                out.push('\n');
                out
            })
            .map_err(|e| CliError::render(format!("Failed to format JSON: {e}")))
    } else {
        Ok(report.to_string())
    }
}

/// Load and validate the target file.
///
/// A missing file is a configuration problem rather than an I/O failure.
pub(crate) fn load_config(args: &ConfigArgs) -> Result<GeneratorConfig, CliError> {
    match GeneratorConfig::load(&args.path) {
        Ok(config) => Ok(config),
        Err(pkgmatrix_core::Error::Io { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Err(CliError::config_with_help(
                format!("Target file not found: {}", args.path.display()),
                "Pass --config or set PKGMATRIX_CONFIG",
            ))
        }
        Err(err) => Err(err.into()),
    }
}

/// Render the workflow for a loaded configuration.
pub(crate) fn render_workflow(
    config_path: &Path,
    config: &GeneratorConfig,
) -> Result<String, CliError> {
    let mut emitter = GitHubActionsEmitter::new();
    if let Some(name) = config_path.file_name() {
        emitter = emitter.with_source_name(name.to_string_lossy());
    }
    tracing::debug!(
        emitter = emitter.format_name(),
        targets = config.targets.len(),
        "Rendering workflow"
    );
    emitter
        .emit(config)
        .map_err(|e| CliError::from(pkgmatrix_core::Error::from(e)))
}
