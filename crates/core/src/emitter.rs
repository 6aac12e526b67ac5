//! Workflow Emitter Trait
//!
//! Defines the interface for rendering a [`GeneratorConfig`] into a
//! provider-native CI configuration. Provider crates (e.g. `pkgmatrix-github`)
//! implement [`Emitter`]; the CLI only talks to the trait.

use crate::config::GeneratorConfig;
use crate::error::format_validation_errors;
use crate::validation::{ConfigValidator, ValidationError};
use thiserror::Error;

/// Error types for emitter operations
#[derive(Debug, Error)]
pub enum EmitterError {
    /// YAML/JSON serialization failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The configuration cannot be rendered
    #[error("Invalid configuration: {}", format_validation_errors(.0))]
    InvalidConfig(Vec<ValidationError>),
}

/// Result type for emitter operations
pub type EmitterResult<T> = std::result::Result<T, EmitterError>;

/// Trait for CI configuration emitters
///
/// Rendering is all-or-nothing: `emit` either returns the complete document
/// or an error, never a partial rendering.
///
/// # Example
///
/// ```
/// use pkgmatrix_core::{Emitter, EmitterResult, GeneratorConfig};
///
/// struct CountingEmitter;
///
/// impl Emitter for CountingEmitter {
///     fn render(&self, config: &GeneratorConfig) -> EmitterResult<String> {
///         Ok(format!("# {} targets\n", config.targets.len()))
///     }
///
///     fn format_name(&self) -> &'static str {
///         "counting"
///     }
///
///     fn file_extension(&self) -> &'static str {
///         "txt"
///     }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Render a configuration that has already been validated.
    ///
    /// # Errors
    /// Returns `EmitterError` if the document cannot be serialized
    fn render(&self, config: &GeneratorConfig) -> EmitterResult<String>;

    /// Validate, then render.
    ///
    /// This is the primary entry point.
    ///
    /// # Errors
    /// Returns `EmitterError::InvalidConfig` with every validation problem, or
    /// any error from [`Emitter::render`]
    fn emit(&self, config: &GeneratorConfig) -> EmitterResult<String> {
        self.validate(config)?;
        self.render(config)
    }

    /// Short format identifier (e.g. "github")
    fn format_name(&self) -> &'static str;

    /// File extension of the rendered document, without the dot
    fn file_extension(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str {
        "CI configuration emitter"
    }

    /// Check that the configuration can be rendered by this emitter.
    ///
    /// # Errors
    /// Returns `EmitterError::InvalidConfig` with every problem found
    fn validate(&self, config: &GeneratorConfig) -> EmitterResult<()> {
        ConfigValidator::new(config)
            .validate()
            .map_err(EmitterError::InvalidConfig)
    }
}
