//! GitHub Actions Workflow Generator
//!
//! Generates the nightly package workflow from a pkgmatrix configuration.
//! GitHub Actions requires committed workflow files in `.github/workflows/`,
//! so the output is meant to be checked in and kept in sync with
//! `pkgmatrix check`.
//!
//! # Example
//!
//! ```
//! use pkgmatrix_core::{Emitter, GeneratorConfig};
//! use pkgmatrix_github::workflow::GitHubActionsEmitter;
//!
//! let config = GeneratorConfig::from_yaml_str(
//!     "targets:\n  linux:\n    - { name: centos-7, platform: centos, platform_version: 7 }\n",
//! )?;
//!
//! let yaml = GitHubActionsEmitter::new().emit(&config)?;
//! assert!(yaml.contains("build-linux:"));
//! assert!(!yaml.contains("build-macos:"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod emitter;
pub mod schema;
pub mod target_renderer;

pub use emitter::GitHubActionsEmitter;
pub use schema::*;
pub use target_renderer::{TargetStepRenderer, matrix_condition, transform_secret_ref};
