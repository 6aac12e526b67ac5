//! Configuration validation
//!
//! Checks that a parsed [`GeneratorConfig`] can be rendered into a well-formed
//! workflow. All problems are collected so a single run reports everything.

use crate::config::GeneratorConfig;
use crate::target::{OsGroup, Target};
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for generator configurations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Both target groups are empty
    #[error("no targets defined; at least one linux or macos target is required")]
    NoTargets,

    /// A target has an empty `name`
    #[error("{group} target #{index} has an empty name")]
    EmptyName {
        /// Group holding the target
        group: OsGroup,
        /// Zero-based position within the group
        index: usize,
    },

    /// A target has an empty `platform`
    #[error("{group} target '{name}' has an empty platform")]
    EmptyPlatform {
        /// Group holding the target
        group: OsGroup,
        /// Target name
        name: String,
    },

    /// A field would break the step condition, job name or tooling path
    #[error(
        "{group} target '{name}' has invalid {field} '{value}' \
         (allowed characters: A-Z a-z 0-9 . _ -)"
    )]
    InvalidCharacters {
        /// Group holding the target
        group: OsGroup,
        /// Target name
        name: String,
        /// Offending field (`name`, `platform` or `platform_version`)
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Two targets of one group share a name
    #[error("duplicate {group} target name '{name}'")]
    DuplicateName {
        /// Group holding both targets
        group: OsGroup,
        /// Repeated name
        name: String,
    },

    /// `workflow.max_parallel` is zero
    #[error("workflow.max_parallel must be at least 1")]
    ZeroParallelism,

    /// Every trigger is disabled
    #[error("workflow.triggers must enable at least one trigger")]
    NoTriggers,

    /// A required workflow setting is empty
    #[error("workflow.{field} must not be empty")]
    EmptySetting {
        /// Setting name below `workflow.`
        field: &'static str,
    },

    /// An `upload_env` key is not a valid environment variable name
    #[error("workflow.upload_env key '{key}' is not a valid environment variable name")]
    InvalidEnvKey {
        /// Offending key
        key: String,
    },
}

/// Validator for generator configurations
pub struct ConfigValidator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> ConfigValidator<'a> {
    /// Create a new validator for the given configuration
    #[must_use]
    pub const fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Validate targets and workflow settings
    ///
    /// # Errors
    ///
    /// Returns every problem found, in target order followed by settings.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.config.targets.is_empty() {
            errors.push(ValidationError::NoTargets);
        }

        for group in OsGroup::ALL {
            Self::validate_group(group, self.config.targets.group(group), &mut errors);
        }

        self.validate_settings(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(count = errors.len(), "Configuration validation failed");
            Err(errors)
        }
    }

    fn validate_group(group: OsGroup, targets: &[Target], errors: &mut Vec<ValidationError>) {
        let mut seen = HashSet::new();

        for (index, target) in targets.iter().enumerate() {
            if target.name.is_empty() {
                errors.push(ValidationError::EmptyName { group, index });
            } else {
                if !is_identifier(&target.name) {
                    errors.push(ValidationError::InvalidCharacters {
                        group,
                        name: target.name.clone(),
                        field: "name",
                        value: target.name.clone(),
                    });
                }
                if !seen.insert(target.name.as_str()) {
                    errors.push(ValidationError::DuplicateName {
                        group,
                        name: target.name.clone(),
                    });
                }
            }

            if target.platform.is_empty() {
                errors.push(ValidationError::EmptyPlatform {
                    group,
                    name: target.name.clone(),
                });
            } else if !is_identifier(&target.platform) {
                errors.push(ValidationError::InvalidCharacters {
                    group,
                    name: target.name.clone(),
                    field: "platform",
                    value: target.platform.clone(),
                });
            }

            if let Some(version) = target.platform_version()
                && !is_identifier(version)
            {
                errors.push(ValidationError::InvalidCharacters {
                    group,
                    name: target.name.clone(),
                    field: "platform_version",
                    value: version.to_string(),
                });
            }
        }
    }

    fn validate_settings(&self, errors: &mut Vec<ValidationError>) {
        let settings = &self.config.workflow;

        if settings.max_parallel == 0 {
            errors.push(ValidationError::ZeroParallelism);
        }

        if !settings.triggers.any() {
            errors.push(ValidationError::NoTriggers);
        }

        let required = [
            ("name", &settings.name),
            ("package", &settings.package),
            ("revision", &settings.revision),
            ("runners.linux", &settings.runners.linux),
            ("runners.macos", &settings.runners.macos),
            ("tooling.repository", &settings.tooling.repository),
            ("tooling.ref", &settings.tooling.git_ref),
            ("tooling.path", &settings.tooling.path),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(ValidationError::EmptySetting { field });
            }
        }

        for key in settings.upload_env.keys() {
            if !is_env_key(key) {
                errors.push(ValidationError::InvalidEnvKey { key: key.clone() });
            }
        }
    }
}

/// `[A-Za-z0-9._-]+`
///
/// Names end up inside single-quoted expressions, artifact names and paths.
fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// `[A-Z_][A-Z0-9_]*`
fn is_env_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c == '_')
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Family, TargetSet};

    fn config(linux: Vec<Target>, macos: Vec<Target>) -> GeneratorConfig {
        GeneratorConfig::new(TargetSet { linux, macos })
    }

    #[test]
    fn test_valid_config() {
        let config = config(
            vec![
                Target::new("centos-7", "centos", "7"),
                Target::new("linux-x86_64", "linux", "x86_64").with_family(Family::Generic),
            ],
            vec![Target::new("macos-x86_64", "macos", "x86_64")],
        );
        assert!(ConfigValidator::new(&config).validate().is_ok());
    }

    #[test]
    fn test_no_targets() {
        let errors = ConfigValidator::new(&config(vec![], vec![]))
            .validate()
            .unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoTargets]);
    }

    #[test]
    fn test_duplicate_names_within_group() {
        let errors = ConfigValidator::new(&config(
            vec![
                Target::new("debian-buster", "debian", "buster"),
                Target::new("debian-buster", "debian", "buster"),
            ],
            vec![],
        ))
        .validate()
        .unwrap_err();

        assert_eq!(
            errors,
            vec![ValidationError::DuplicateName {
                group: OsGroup::Linux,
                name: "debian-buster".to_string(),
            }]
        );
    }

    #[test]
    fn test_same_name_in_different_groups_is_allowed() {
        let config = config(
            vec![Target::new("generic", "linux", "")],
            vec![Target::new("generic", "macos", "")],
        );
        assert!(ConfigValidator::new(&config).validate().is_ok());
    }

    #[test]
    fn test_empty_fields() {
        let errors = ConfigValidator::new(&config(vec![Target::new("", "", "")], vec![]))
            .validate()
            .unwrap_err();

        assert!(errors.contains(&ValidationError::EmptyName {
            group: OsGroup::Linux,
            index: 0
        }));
        assert!(errors.contains(&ValidationError::EmptyPlatform {
            group: OsGroup::Linux,
            name: String::new()
        }));
    }

    #[test]
    fn test_quote_in_name_is_rejected() {
        let errors = ConfigValidator::new(&config(vec![Target::new("it's", "debian", "")], vec![]))
            .validate()
            .unwrap_err();

        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidCharacters { field: "name", .. }]
        ));
    }

    #[test]
    fn test_invalid_platform_version() {
        let errors = ConfigValidator::new(&config(
            vec![Target::new("ubuntu", "ubuntu", "20.04 lts")],
            vec![],
        ))
        .validate()
        .unwrap_err();

        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidCharacters {
                field: "platform_version",
                ..
            }]
        ));
    }

    #[test]
    fn test_settings_errors_are_collected() {
        let mut config = config(vec![Target::new("centos-7", "centos", "7")], vec![]);
        config.workflow.max_parallel = 0;
        config.workflow.triggers.schedule.clear();
        config.workflow.triggers.branches.clear();
        config.workflow.triggers.workflow_dispatch = false;
        config.workflow.tooling.path = String::new();
        config
            .workflow
            .upload_env
            .insert("lower-case".to_string(), "x".to_string());

        let errors = ConfigValidator::new(&config).validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroParallelism,
                ValidationError::NoTriggers,
                ValidationError::EmptySetting {
                    field: "tooling.path"
                },
                ValidationError::InvalidEnvKey {
                    key: "lower-case".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_env_key_rules() {
        assert!(is_env_key("PACKAGE_UPLOAD_SSH_KEY"));
        assert!(is_env_key("_PRIVATE"));
        assert!(!is_env_key("1KEY"));
        assert!(!is_env_key(""));
        assert!(!is_env_key("key"));
    }
}
