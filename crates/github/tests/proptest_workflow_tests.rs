//! Property-based tests for workflow rendering invariants.
//!
//! These tests verify the behavioral contracts of the generator:
//! - The matrix axis lists target names in input order without duplicates
//! - Generic targets, and only those, carry `BUILD_GENERIC`
//! - Publish jobs depend on the build job of their group
//! - Rendering is byte-for-byte deterministic

use pkgmatrix_core::{Emitter, Family, GeneratorConfig, OsGroup, Target, TargetSet};
use pkgmatrix_github::GitHubActionsEmitter;
use proptest::prelude::*;

// =============================================================================
// Strategies for generating test data
// =============================================================================

fn family_strategy() -> impl Strategy<Value = Family> {
    prop_oneof![Just(Family::Generic), Just(Family::DistroSpecific)]
}

/// Generate targets with unique names by suffixing the index.
fn targets_strategy(max: usize) -> impl Strategy<Value = Vec<Target>> {
    proptest::collection::vec(
        (
            "[a-z][a-z0-9]{0,8}",
            "[a-z0-9_.]{0,6}",
            family_strategy(),
        ),
        0..=max,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (platform, version, family))| {
                Target::new(format!("{platform}-{i}"), platform, version).with_family(family)
            })
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = GeneratorConfig> {
    (targets_strategy(8), targets_strategy(4))
        .prop_filter("at least one target", |(linux, macos)| {
            !linux.is_empty() || !macos.is_empty()
        })
        .prop_map(|(linux, macos)| GeneratorConfig::new(TargetSet { linux, macos }))
}

fn render(config: &GeneratorConfig) -> String {
    GitHubActionsEmitter::new()
        .emit(config)
        .expect("generated configurations are valid")
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Matrix axis equals target names in input order, with no duplicates.
    #[test]
    fn matrix_preserves_input_order(config in config_strategy()) {
        let workflow = GitHubActionsEmitter::new().build_workflow(&config);

        for (group, targets) in config.targets.groups() {
            let job = &workflow.jobs[&group.build_job_id()];
            let axis = job
                .strategy
                .as_ref()
                .and_then(|s| s.matrix.axis("target"))
                .unwrap_or_default();
            let expected: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
            let actual: Vec<&str> = axis.iter().map(String::as_str).collect();
            prop_assert_eq!(&actual, &expected);

            let mut unique = actual.clone();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(unique.len(), actual.len());
        }
    }

    /// Generic targets carry `BUILD_GENERIC`; all others never do.
    #[test]
    fn build_generic_follows_family(config in config_strategy()) {
        let workflow = GitHubActionsEmitter::new().build_workflow(&config);

        for (group, targets) in config.targets.groups() {
            let job = &workflow.jobs[&group.build_job_id()];
            for target in targets {
                let condition = format!("matrix.target == '{}'", target.name);
                let step = job
                    .steps
                    .iter()
                    .find(|s| s.if_condition.as_deref() == Some(condition.as_str()));
                prop_assert!(step.is_some(), "missing build step for {}", target.name);
                let has_flag = step.is_some_and(|s| s.env.contains_key("BUILD_GENERIC"));
                prop_assert_eq!(has_flag, target.family == Family::Generic);
            }
        }
    }

    /// Publish jobs exist exactly for non-empty groups and need their build job.
    #[test]
    fn publish_needs_build(config in config_strategy()) {
        let workflow = GitHubActionsEmitter::new().build_workflow(&config);

        for group in OsGroup::ALL {
            let present = !config.targets.group(group).is_empty();
            prop_assert_eq!(workflow.jobs.contains_key(&group.build_job_id()), present);
            match workflow.jobs.get(&group.publish_job_id()) {
                Some(job) => {
                    prop_assert!(present);
                    prop_assert_eq!(&job.needs, &vec![group.build_job_id()]);
                }
                None => prop_assert!(!present),
            }
        }
    }

    /// Rendering the same configuration twice is byte-identical.
    #[test]
    fn rendering_is_deterministic(config in config_strategy()) {
        let first = render(&config);
        let second = render(&config.clone());
        prop_assert_eq!(first, second);
    }

    /// No env value is ever rendered empty.
    #[test]
    fn env_values_are_never_empty(config in config_strategy()) {
        let workflow = GitHubActionsEmitter::new().build_workflow(&config);
        for job in workflow.jobs.values() {
            for step in &job.steps {
                for (key, value) in &step.env {
                    prop_assert!(!value.is_empty(), "empty value for {}", key);
                }
            }
        }
    }
}
