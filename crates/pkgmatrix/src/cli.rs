//! Command-line surface: arguments, error categories and exit codes.
//!
//! Every failure is a [`CliError`]; [`exit_code_for`] maps it to the
//! process exit status and [`render_error`] prints it as a diagnostic or a
//! JSON envelope.

use crate::output::DEFAULT_OUTPUT_PATH;
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use miette::{Diagnostic, Report};
use pkgmatrix_core::config::DEFAULT_CONFIG_PATH;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// The committed workflow differs from a fresh render
pub const EXIT_DRIFT: i32 = 1;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Rendering or I/O error exit code
pub const EXIT_RENDER: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Generated workflow is out of date (exit code 1)
    #[error("Workflow is out of date: {message}")]
    #[diagnostic(code(pkgmatrix::cli::drift))]
    Drift {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// CLI or configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(pkgmatrix::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Rendering or I/O error (exit code 3)
    #[error("Render error: {message}")]
    #[diagnostic(code(pkgmatrix::cli::render))]
    Render {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new drift error with help text
    #[must_use]
    pub fn drift_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Drift {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new render error
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new render error with help text
    #[must_use]
    pub fn render_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Short machine-readable category used in JSON envelopes
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Drift { .. } => "drift",
            Self::Config { .. } => "config",
            Self::Render { .. } => "render",
        }
    }
}

/// Convert `pkgmatrix_core::Error` to the appropriate `CliError` variant.
///
/// - Parse and validation failures -> Config (exit code 2)
/// - Serialization and I/O failures -> Render (exit code 3)
impl From<pkgmatrix_core::Error> for CliError {
    fn from(err: pkgmatrix_core::Error) -> Self {
        use pkgmatrix_core::Error;
        match err {
            // Extract just the message to avoid "Configuration error: Configuration error:"
            Error::Configuration { message, help } => Self::Config { message, help },
            Error::Parse { .. } => Self::config_with_help(
                err.to_string(),
                "Check the field against the target file format in the readme",
            ),
            Error::Io { .. } => Self::render_with_help(
                err.to_string(),
                "Check file permissions and ensure the path exists",
            ),
            _ if err.is_configuration() => Self::config(err.to_string()),
            _ => Self::render(err.to_string()),
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Drift { .. } => EXIT_DRIFT,
        CliError::Config { .. } => EXIT_CLI,
        CliError::Render { .. } => EXIT_RENDER,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Main CLI entry point for pkgmatrix.
///
/// Generates the nightly package build and publish workflow from a
/// declarative target list.
#[derive(Parser, Debug)]
#[command(name = "pkgmatrix")]
#[command(about = "Generate nightly package build and publish workflows from a target list")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Emit JSON envelopes on stdout and JSON logs on stderr.
    #[arg(long, global = true, help = "Emit JSON envelope regardless of format")]
    pub json: bool,

    /// Log output format; defaults to `json` with `--json`, `pretty` otherwise.
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    pub log_format: Option<TracingFormat>,
}

impl Cli {
    /// Log format after applying the `--json` default
    #[must_use]
    pub fn tracing_format(&self) -> TracingFormat {
        self.log_format.unwrap_or(if self.json {
            TracingFormat::Json
        } else {
            TracingFormat::Pretty
        })
    }
}

/// Location of the target file, shared by all subcommands.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the target file.
    #[arg(
        short = 'c',
        long = "config",
        env = "PKGMATRIX_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        value_name = "FILE",
        help = "Target file to read"
    )]
    pub path: PathBuf,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the workflow and write it to disk (or stdout).
    #[command(about = "Render the workflow and write it to disk")]
    Generate {
        /// Target file.
        #[command(flatten)]
        config: ConfigArgs,
        /// Output path, `-` for stdout.
        #[arg(
            short = 'o',
            long,
            default_value = DEFAULT_OUTPUT_PATH,
            value_name = "PATH",
            help = "Workflow file to write, '-' for stdout"
        )]
        output: PathBuf,
        /// Report what would change without writing.
        #[arg(long, help = "Report what would change without writing")]
        dry_run: bool,
    },
    /// Compare the committed workflow with a fresh render.
    #[command(about = "Fail with exit code 1 when the workflow on disk is out of date")]
    Check {
        /// Target file.
        #[command(flatten)]
        config: ConfigArgs,
        /// Workflow file to compare against.
        #[arg(
            short = 'o',
            long,
            default_value = DEFAULT_OUTPUT_PATH,
            value_name = "PATH",
            help = "Workflow file to compare against"
        )]
        output: PathBuf,
    },
    /// List the validated targets per group.
    #[command(about = "List the validated targets per group")]
    Targets {
        /// Target file.
        #[command(flatten)]
        config: ConfigArgs,
    },
}

impl Commands {
    /// Subcommand name, used for tracing spans
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Generate { .. } => "generate",
            Self::Check { .. } => "check",
            Self::Targets { .. } => "targets",
        }
    }
}

/// Parse command-line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_defaults() {
        temp_env::with_var_unset("PKGMATRIX_CONFIG", || {
            let cli = Cli::try_parse_from(["pkgmatrix", "generate"]).unwrap();
            assert_eq!(cli.level, LogLevel::Warn);
            assert!(!cli.json);
            match cli.command {
                Some(Commands::Generate {
                    config,
                    output,
                    dry_run,
                }) => {
                    assert_eq!(config.path, PathBuf::from(DEFAULT_CONFIG_PATH));
                    assert_eq!(output, PathBuf::from(DEFAULT_OUTPUT_PATH));
                    assert!(!dry_run);
                }
                other => panic!("unexpected command: {other:?}"),
            }
        });
    }

    #[test]
    fn test_config_path_from_environment() {
        temp_env::with_var("PKGMATRIX_CONFIG", Some("ci/targets.yml"), || {
            let cli = Cli::try_parse_from(["pkgmatrix", "targets"]).unwrap();
            match cli.command {
                Some(Commands::Targets { config }) => {
                    assert_eq!(config.path, PathBuf::from("ci/targets.yml"));
                }
                other => panic!("unexpected command: {other:?}"),
            }
        });
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pkgmatrix", "check", "-c", "t.yml", "-o", "w.yml", "--json", "-L", "debug",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.level, LogLevel::Debug);
        assert_eq!(cli.command.as_ref().map(Commands::name), Some("check"));
        assert_eq!(cli.tracing_format(), TracingFormat::Json);
    }

    #[test]
    fn test_log_format_selection() {
        let cli = Cli::try_parse_from(["pkgmatrix", "targets"]).unwrap();
        assert_eq!(cli.tracing_format(), TracingFormat::Pretty);

        let cli = Cli::try_parse_from(["pkgmatrix", "targets", "--log-format", "compact"]).unwrap();
        assert_eq!(cli.tracing_format(), TracingFormat::Compact);

        let cli =
            Cli::try_parse_from(["pkgmatrix", "--json", "--log-format", "pretty", "targets"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.tracing_format(), TracingFormat::Pretty);

        assert!(Cli::try_parse_from(["pkgmatrix", "--log-format", "xml", "targets"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&CliError::drift_with_help("x", "y")), EXIT_DRIFT);
        assert_eq!(exit_code_for(&CliError::config("x")), EXIT_CLI);
        assert_eq!(exit_code_for(&CliError::render("x")), EXIT_RENDER);
    }

    #[test]
    fn test_core_error_mapping() {
        let parse = pkgmatrix_core::Error::parse("t.yml", "targets.linux[0].family", "bad");
        assert!(matches!(CliError::from(parse), CliError::Config { .. }));

        let validation = pkgmatrix_core::Error::Validation(vec![]);
        assert!(matches!(CliError::from(validation), CliError::Config { .. }));

        let io = pkgmatrix_core::Error::io(
            std::io::Error::other("denied"),
            std::path::Path::new("w.yml"),
            "write",
        );
        let err = CliError::from(io);
        assert!(matches!(err, CliError::Render { .. }));
        assert!(err.to_string().contains("w.yml"));

        let empty = pkgmatrix_core::GeneratorConfig::from_yaml_str("").unwrap_err();
        let err = CliError::from(empty);
        assert_eq!(err.to_string(), "Configuration error: <inline> contains no targets");
        assert_eq!(exit_code_for(&err), EXIT_CLI);
    }

    #[test]
    fn test_envelopes() {
        let ok = serde_json::to_value(OkEnvelope::new(serde_json::json!({"n": 1}))).unwrap();
        assert_eq!(ok["status"], "ok");
        assert_eq!(ok["data"]["n"], 1);

        let err = serde_json::to_value(ErrorEnvelope::new("boom")).unwrap();
        assert_eq!(err["status"], "error");
        assert_eq!(err["error"], "boom");
    }
}
