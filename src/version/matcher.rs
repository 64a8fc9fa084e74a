//! Version matching abstraction consumed by a dependency resolver

use tracing::warn;

use crate::version::constraint::{Requirement, is_wildcard};
use crate::version::dep::DepVersion;
use crate::version::semver::{CompareResult, compare_versions};

/// Trait for ecosystem-specific version matching logic
pub trait VersionMatcher: Send + Sync {
    /// Check if a version specification matches any available version
    ///
    /// For dep: ^1.0.0 matches 1.0.0, 1.1.0, 1.9.9, but not 2.0.0
    fn version_exists(&self, version_spec: &str, available_versions: &[String]) -> bool;

    /// Compare the current version specification to the latest version
    ///
    /// Returns whether the current version is latest, outdated, newer, or invalid
    fn compare_to_latest(&self, current_version: &str, latest_version: &str) -> CompareResult;
}

/// Matcher for dep versions and constraints
pub struct DepVersionMatcher;

impl VersionMatcher for DepVersionMatcher {
    fn version_exists(&self, version_spec: &str, available_versions: &[String]) -> bool {
        // Pseudo-versions are commit-specific and never appear in tag lists
        if DepVersion::new(version_spec).is_pseudo_version() {
            return true;
        }

        let Ok(requirement) = Requirement::parse(version_spec) else {
            return false;
        };

        available_versions
            .iter()
            .filter(|v| !v.is_empty() && DepVersion::is_valid(v))
            .any(|v| requirement.is_satisfied_by(&DepVersion::new(v.as_str())))
    }

    fn compare_to_latest(&self, current_version: &str, latest_version: &str) -> CompareResult {
        // A pinned version compares directly; `v1.2.3` is a version, not `^1.2.3`
        let is_pinned = !current_version.is_empty()
            && DepVersion::is_valid(current_version)
            && !is_wildcard(current_version);
        if is_pinned {
            return compare_versions(current_version, latest_version);
        }

        let requirement = match Requirement::parse(current_version) {
            Ok(requirement) => requirement,
            Err(e) => {
                warn!("Invalid dep constraint '{}': {}", current_version, e);
                return CompareResult::Invalid;
            }
        };

        let Ok(latest) = DepVersion::parse(latest_version) else {
            warn!("Invalid version format: '{}'", latest_version);
            return CompareResult::Invalid;
        };

        if requirement.is_satisfied_by(&latest) {
            return CompareResult::Latest;
        }

        // For Any (*), if not satisfied (which can't happen), treat as Latest
        let Some(base) = requirement.base_version() else {
            return CompareResult::Latest;
        };

        if base < latest {
            CompareResult::Outdated
        } else {
            CompareResult::Newer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("v1.0.0", "v1.0.0", CompareResult::Latest)]
    #[case("v1.0.0", "v2.0.0", CompareResult::Outdated)]
    #[case("v2.0.0", "v1.0.0", CompareResult::Newer)]
    #[case("v2.0.0+incompatible", "v2.0.0", CompareResult::Latest)]
    #[case("1.0.0-pre1", "1.0.0", CompareResult::Outdated)]
    // Constraints
    #[case("^1.0.0", "1.5.0", CompareResult::Latest)]
    #[case("^1.0.0", "2.0.0", CompareResult::Outdated)]
    #[case("<1.0.0", "0.9.0", CompareResult::Latest)]
    #[case(">=3.0.0", "2.0.0", CompareResult::Newer)]
    #[case("1.x", "2.0.0", CompareResult::Outdated)]
    #[case("*", "2.0.0", CompareResult::Latest)]
    // Invalid
    #[case("not a version", "1.0.0", CompareResult::Invalid)]
    #[case("^1.0.0", "va1.0.0", CompareResult::Invalid)]
    fn compare_to_latest_returns_expected(
        #[case] current: &str,
        #[case] latest: &str,
        #[case] expected: CompareResult,
    ) {
        let matcher = DepVersionMatcher;
        assert_eq!(matcher.compare_to_latest(current, latest), expected);
    }

    #[rstest]
    #[case("v1.0.0", &["v1.0.0", "v1.1.0"], true)]
    #[case("=v1.0.0", &["v1.1.0", "v2.0.0"], false)]
    #[case("v2.0.0+incompatible", &["v2.0.0"], true)]
    #[case("=v2.0.0", &["v2.0.0+incompatible"], true)]
    #[case(">= 1.0.0", &["0.9.0", "1.0.0-pre1"], false)]
    #[case(">= 1.0.0", &["0.9.0", "1.1.0-pre"], true)]
    #[case("^1.0.0", &["invalid", "va1.2.0"], false)]
    #[case("^0", &["0.5.0"], true)]
    #[case("not a version", &["1.0.0"], false)]
    // Pseudo-versions should always return true (skip validation)
    #[case("v0.0.0-20210101000000-abc123", &["v1.0.0", "v2.0.0"], true)]
    #[case("v1.1.3-0.20240916144458-20a13a1f6b7c", &["v1.0.0"], true)]
    fn version_exists_returns_expected(
        #[case] version: &str,
        #[case] available: &[&str],
        #[case] expected: bool,
    ) {
        let matcher = DepVersionMatcher;
        let available: Vec<String> = available.iter().map(|s| s.to_string()).collect();
        assert_eq!(matcher.version_exists(version, &available), expected);
    }
}
