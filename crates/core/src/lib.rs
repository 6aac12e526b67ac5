//! Core types for pkgmatrix.
//!
//! This crate owns everything that is independent of the CI provider:
//! - [`Target`], [`TargetSet`] and [`OsGroup`], the declarative build matrix
//! - [`GeneratorConfig`], the YAML file that carries the targets plus
//!   workflow-level settings
//! - [`ConfigValidator`], which collects every configuration problem before
//!   anything is rendered
//! - the [`Emitter`] trait implemented by provider crates
//!
//! # Example
//!
//! ```
//! use pkgmatrix_core::{GeneratorConfig, OsGroup};
//!
//! let config = GeneratorConfig::from_yaml_str(
//!     r#"
//! targets:
//!   linux:
//!     - { name: centos-7, platform: centos, platform_version: 7 }
//! "#,
//! )?;
//! config.validate()?;
//!
//! assert_eq!(config.targets.group(OsGroup::Linux).len(), 1);
//! assert!(config.targets.group(OsGroup::Macos).is_empty());
//! # Ok::<(), pkgmatrix_core::Error>(())
//! ```

pub mod config;
pub mod emitter;
mod error;
pub mod target;
pub mod validation;

pub use config::{GeneratorConfig, Runners, Tooling, Triggers, WorkflowSettings};
pub use emitter::{Emitter, EmitterError, EmitterResult};
pub use error::{Error, Result};
pub use target::{Family, OsGroup, Target, TargetSet};
pub use validation::{ConfigValidator, ValidationError};
