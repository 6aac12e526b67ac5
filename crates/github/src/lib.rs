//! GitHub provider implementation for pkgmatrix.
//!
//! This crate provides [`workflow::GitHubActionsEmitter`], which renders a
//! [`pkgmatrix_core::GeneratorConfig`] into a GitHub Actions workflow with
//! one build and one publish matrix job per non-empty OS group.

#![warn(missing_docs)]

pub mod workflow;

pub use workflow::GitHubActionsEmitter;
