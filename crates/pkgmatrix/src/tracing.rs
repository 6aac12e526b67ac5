//! Tracing configuration for the pkgmatrix CLI
//!
//! Logs always go to stderr so that stdout stays reserved for command output
//! (workflow YAML with `-o -`, JSON envelopes with `--json`).

use std::io;
pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Tracing output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TracingFormat {
    /// Pretty-printed human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format
    Json,
}

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above
    Info,
    /// Show warnings and above (default)
    Warn,
    /// Show errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Output format
    pub format: TracingFormat,
    /// Maximum level for pkgmatrix crates when `RUST_LOG` is unset
    pub level: Level,
    /// Include source file and line in pretty and compact output
    pub enable_file_location: bool,
}

impl TracingConfig {
    /// Configuration for a CLI run; debug and trace output carry source locations.
    #[must_use]
    pub fn new(format: TracingFormat, level: LogLevel) -> Self {
        Self {
            format,
            level: level.into(),
            enable_file_location: matches!(level, LogLevel::Debug | LogLevel::Trace),
        }
    }
}

/// Global correlation ID for tracing request correlation
static CORRELATION_ID: std::sync::OnceLock<Uuid> = std::sync::OnceLock::new();

/// Get or create a correlation ID for the current session
pub fn correlation_id() -> Uuid {
    *CORRELATION_ID.get_or_init(Uuid::new_v4)
}

/// Filter directive enabling `level` for every pkgmatrix crate
#[must_use]
pub fn default_directive(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("pkgmatrix={level},pkgmatrix_core={level},pkgmatrix_github={level}")
}

/// Initialize tracing with the given configuration
///
/// # Errors
///
/// Fails when the default filter directive is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> miette::Result<()> {
    let correlation_id = correlation_id();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(config.level)))
        .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let init = match config.format {
        TracingFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(config.enable_file_location)
                .with_line_number(config.enable_file_location);
            registry.with(layer).try_init()
        }
        TracingFormat::Compact => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_target(false)
                .with_file(config.enable_file_location)
                .with_line_number(config.enable_file_location);
            registry.with(layer).try_init()
        }
        TracingFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_span_list(true);
            registry.with(layer).try_init()
        }
    };
    init.map_err(|e| miette::miette!("Failed to install tracing subscriber: {e}"))?;

    tracing::info!(
        correlation_id = %correlation_id,
        version = env!("CARGO_PKG_VERSION"),
        format = ?config.format,
        "Tracing initialized for pkgmatrix"
    );

    Ok(())
}

/// Create a span for command execution carrying the correlation id
#[macro_export]
macro_rules! command_span {
    ($command:expr) => {
        ::tracing::info_span!(
            "command",
            command = %$command,
            correlation_id = %$crate::tracing::correlation_id(),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_values() {
        use clap::ValueEnum;
        assert_eq!(
            TracingFormat::from_str("compact", true),
            Ok(TracingFormat::Compact)
        );
        assert_eq!(TracingFormat::from_str("JSON", true), Ok(TracingFormat::Json));
        assert!(TracingFormat::from_str("invalid", true).is_err());
    }

    #[test]
    fn test_file_location_follows_level() {
        let config = TracingConfig::new(TracingFormat::Compact, LogLevel::Debug);
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.enable_file_location);

        let config = TracingConfig::new(TracingFormat::Pretty, LogLevel::Warn);
        assert!(!config.enable_file_location);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_default_directive_covers_all_crates() {
        assert_eq!(
            default_directive(Level::DEBUG),
            "pkgmatrix=debug,pkgmatrix_core=debug,pkgmatrix_github=debug"
        );
    }

    #[test]
    fn test_correlation_id_consistency() {
        assert_eq!(correlation_id(), correlation_id());
    }
}
