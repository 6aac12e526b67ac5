//! pkgmatrix command-line interface.
//!
//! Reads a declarative list of package build targets and renders the nightly
//! GitHub Actions workflow that builds and publishes packages for each of
//! them. The binary in `main.rs` is a thin wrapper around [`cli`] and
//! [`commands`].

pub mod cli;
pub mod commands;
pub mod output;
pub mod tracing;
