use crate::emitter::EmitterError;
use crate::validation::ValidationError;
use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Main error type for pkgmatrix operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The configuration file could not be deserialized.
    ///
    /// `field` is the dotted path to the offending value
    /// (e.g. `targets.linux[2].family`), `.` when the document itself is malformed.
    #[error("Invalid configuration in {source_name} at `{field}`: {message}")]
    #[diagnostic(
        code(pkgmatrix::config::parse),
        help("check the field against the documented target file format")
    )]
    Parse {
        /// File name or `<inline>` for in-memory input
        source_name: String,
        /// Path to the failing field
        field: String,
        /// Underlying deserializer message
        message: String,
    },

    /// The configuration parsed but is not usable.
    #[error("Validation failed: {}", format_validation_errors(.0))]
    #[diagnostic(code(pkgmatrix::config::validation))]
    Validation(Vec<ValidationError>),

    /// The configuration is unusable as a whole, e.g. an empty target file
    #[error("Configuration error: {message}")]
    #[diagnostic(code(pkgmatrix::config))]
    Configuration {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },

    /// Rendering the workflow failed
    #[error(transparent)]
    #[diagnostic(code(pkgmatrix::emit))]
    Emit(#[from] EmitterError),

    /// I/O failure with the path and operation that caused it
    #[error("I/O {operation} failed{}: {source}", display_path(path.as_deref()))]
    #[diagnostic(code(pkgmatrix::io))]
    Io {
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path involved, if any
        path: Option<Box<Path>>,
        /// What was being attempted (e.g. "read", "write")
        operation: String,
    },
}

impl Error {
    /// Create a configuration error with help text
    #[must_use]
    pub fn configuration_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a parse error for a field of a named source
    #[must_use]
    pub fn parse(
        source_name: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path and operation it belongs to
    #[must_use]
    pub fn io(source: std::io::Error, path: &Path, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
            operation: operation.into(),
        }
    }

    /// Whether the error stems from user configuration rather than the environment
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::Validation(_)
                | Self::Configuration { .. }
                | Self::Emit(EmitterError::InvalidConfig(_))
        )
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(String::new, |p| format!(" on {}", p.display()))
}

pub(crate) fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for pkgmatrix operations
pub type Result<T> = std::result::Result<T, Error>;
