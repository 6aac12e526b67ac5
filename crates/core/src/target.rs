//! Build target model.
//!
//! A [`Target`] is one platform/version combination to build and publish
//! packages for. Targets are grouped by [`OsGroup`] in a [`TargetSet`]; the
//! order inside each group is significant and preserved all the way into the
//! rendered workflow.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Build variant of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// Portable build not tied to a distribution release
    Generic,
    /// Build for one specific distribution release
    #[default]
    DistroSpecific,
}

impl Family {
    /// Name as written in configuration files
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::DistroSpecific => "distro-specific",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system family a target belongs to.
///
/// Each group renders into its own pair of build/publish jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsGroup {
    /// Linux distributions (built through container actions)
    Linux,
    /// macOS (built through shell scripts on a macOS runner)
    Macos,
}

impl OsGroup {
    /// All groups in rendering order
    pub const ALL: [Self; 2] = [Self::Linux, Self::Macos];

    /// Lowercase group name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
        }
    }

    /// Job id of the build job for this group
    #[must_use]
    pub fn build_job_id(self) -> String {
        format!("build-{}", self.as_str())
    }

    /// Job id of the publish job for this group
    #[must_use]
    pub fn publish_job_id(self) -> String {
        format!("publish-{}", self.as_str())
    }

    /// Runner label used when the configuration does not override it
    #[must_use]
    pub const fn default_runner(self) -> &'static str {
        match self {
            Self::Linux => "ubuntu-latest",
            Self::Macos => "macos-latest",
        }
    }
}

impl fmt::Display for OsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One platform/version combination to build and publish for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Identifier, unique within its group; becomes the matrix value
    pub name: String,

    /// Platform name (e.g. "debian", "centos", "macos")
    pub platform: String,

    /// Platform release, empty when the target is not versioned
    #[serde(
        default,
        deserialize_with = "deserialize_platform_version",
        skip_serializing_if = "String::is_empty"
    )]
    pub platform_version: String,

    /// Build variant
    #[serde(default)]
    pub family: Family,
}

impl Target {
    /// Create a distro-specific target
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        platform: impl Into<String>,
        platform_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            platform_version: platform_version.into(),
            family: Family::DistroSpecific,
        }
    }

    /// Set the family
    #[must_use]
    pub const fn with_family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }

    /// Whether this is a generic build
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.family == Family::Generic
    }

    /// Platform version, `None` when empty
    #[must_use]
    pub fn platform_version(&self) -> Option<&str> {
        if self.platform_version.is_empty() {
            None
        } else {
            Some(&self.platform_version)
        }
    }

    /// `platform` or `platform-platform_version`.
    ///
    /// Names the per-platform directory of the external build and upload
    /// tooling.
    #[must_use]
    pub fn slug(&self) -> String {
        self.platform_version().map_or_else(
            || self.platform.clone(),
            |version| format!("{}-{version}", self.platform),
        )
    }
}

/// Accepts a string, an integer, or null for `platform_version`.
///
/// YAML turns `platform_version: 7` into an integer, and `0x1F` into 31,
/// so integers are rendered in decimal. Floats are refused because `10.10`
/// would come back as `10.1`.
fn deserialize_platform_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct PlatformVersionVisitor;

    impl Visitor<'_> for PlatformVersionVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a platform version string or integer")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_owned())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(PlatformVersionVisitor)
}

/// Targets grouped by operating system, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSet {
    /// Linux targets
    #[serde(default)]
    pub linux: Vec<Target>,
    /// macOS targets
    #[serde(default)]
    pub macos: Vec<Target>,
}

impl TargetSet {
    /// Targets of one group
    #[must_use]
    pub fn group(&self, group: OsGroup) -> &[Target] {
        match group {
            OsGroup::Linux => &self.linux,
            OsGroup::Macos => &self.macos,
        }
    }

    /// Non-empty groups in rendering order
    pub fn groups(&self) -> impl Iterator<Item = (OsGroup, &[Target])> {
        OsGroup::ALL
            .into_iter()
            .map(|group| (group, self.group(group)))
            .filter(|(_, targets)| !targets.is_empty())
    }

    /// Total number of targets across groups
    #[must_use]
    pub fn len(&self) -> usize {
        self.linux.len() + self.macos.len()
    }

    /// Whether no group has any target
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.linux.is_empty() && self.macos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_with_and_without_version() {
        assert_eq!(Target::new("centos-7", "centos", "7").slug(), "centos-7");
        assert_eq!(Target::new("alpine", "alpine", "").slug(), "alpine");
    }

    #[test]
    fn test_family_defaults_to_distro_specific() {
        let target: Target = serde_yaml::from_str(
            "{ name: debian-buster, platform: debian, platform_version: buster }",
        )
        .unwrap();
        assert_eq!(target.family, Family::DistroSpecific);
        assert!(!target.is_generic());
    }

    #[test]
    fn test_family_generic() {
        let target: Target = serde_yaml::from_str(
            "{ name: linux-x86_64, platform: linux, platform_version: x86_64, family: generic }",
        )
        .unwrap();
        assert!(target.is_generic());
    }

    #[test]
    fn test_unknown_family_is_rejected() {
        let result: Result<Target, _> =
            serde_yaml::from_str("{ name: x, platform: linux, family: portable }");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("portable"), "unexpected error: {err}");
    }

    #[test]
    fn test_integer_platform_version() {
        let target: Target = serde_yaml::from_str(
            "{ name: centos-8, platform: centos, platform_version: 8 }",
        )
        .unwrap();
        assert_eq!(target.platform_version, "8");
    }

    #[test]
    fn test_non_decimal_integer_versions_render_in_decimal() {
        let target: Target =
            serde_yaml::from_str("{ name: x, platform: linux, platform_version: 0x1F }").unwrap();
        assert_eq!(target.platform_version, "31");

        let target: Target =
            serde_yaml::from_str("{ name: x, platform: linux, platform_version: '0x1F' }").unwrap();
        assert_eq!(target.platform_version, "0x1F");
        assert_eq!(target.slug(), "linux-0x1F");
    }

    #[test]
    fn test_null_or_missing_platform_version() {
        let target: Target = serde_yaml::from_str(
            "{ name: alpine, platform: alpine, platform_version: ~ }",
        )
        .unwrap();
        assert_eq!(target.platform_version(), None);

        let target: Target = serde_yaml::from_str("{ name: alpine, platform: alpine }").unwrap();
        assert_eq!(target.platform_version(), None);
    }

    #[test]
    fn test_float_platform_version_is_rejected() {
        let result: Result<Target, _> =
            serde_yaml::from_str("{ name: macos, platform: macos, platform_version: 10.10 }");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_target_field_is_rejected() {
        let result: Result<Target, _> =
            serde_yaml::from_str("{ name: x, platform: linux, arch: arm64 }");
        assert!(result.is_err());
    }

    #[test]
    fn test_groups_skip_empty() {
        let set = TargetSet {
            linux: vec![],
            macos: vec![Target::new("macos-x86_64", "macos", "x86_64")],
        };
        let groups: Vec<_> = set.groups().map(|(g, _)| g).collect();
        assert_eq!(groups, vec![OsGroup::Macos]);
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
        assert!(TargetSet::default().is_empty());
    }

    #[test]
    fn test_job_ids() {
        assert_eq!(OsGroup::Linux.build_job_id(), "build-linux");
        assert_eq!(OsGroup::Macos.publish_job_id(), "publish-macos");
        assert_eq!(OsGroup::Macos.to_string(), "macos");
    }
}
