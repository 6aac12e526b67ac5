//! `pkgmatrix targets`: list validated targets per group.

use crate::cli::{CliError, ConfigArgs};
use indexmap::IndexMap;
use pkgmatrix_core::Target;
use serde::Serialize;
use std::fmt;
use tracing::instrument;

/// Result of `pkgmatrix targets`: validated targets keyed by group name
#[derive(Debug, Clone, Serialize)]
pub struct TargetsReport {
    /// Non-empty groups in rendering order
    pub groups: IndexMap<String, Vec<Target>>,
}

impl fmt::Display for TargetsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (group, targets) in &self.groups {
            writeln!(f, "{group} ({}):", targets.len())?;
            for target in targets {
                writeln!(f, "  {} -> {} [{}]", target.name, target.slug(), target.family)?;
            }
        }
        Ok(())
    }
}

/// List the targets of a validated configuration.
#[instrument(name = "targets", skip(config), fields(config = %config.path.display()))]
pub fn execute(config: &ConfigArgs) -> Result<TargetsReport, CliError> {
    let generator_config = super::load_config(config)?;
    let groups = generator_config
        .targets
        .groups()
        .map(|(group, targets)| (group.to_string(), targets.to_vec()))
        .collect();
    Ok(TargetsReport { groups })
}
