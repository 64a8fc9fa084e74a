use std::cmp::Ordering;

use semver::{Prerelease, Version};
use tracing::{debug, warn};

use crate::version::dep::DepVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    Latest,
    Outdated,
    Newer,
    Invalid,
}

impl From<Ordering> for CompareResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => CompareResult::Outdated,
            Ordering::Equal => CompareResult::Latest,
            Ordering::Greater => CompareResult::Newer,
        }
    }
}

/// Parse a candidate version, skipping invalid and empty strings.
///
/// Empty strings are valid dep versions but carry no version info, so they
/// are never a useful candidate.
fn parse_candidate(version: &str) -> Option<DepVersion> {
    if version.is_empty() || !DepVersion::is_valid(version) {
        debug!("Skipping invalid version candidate: '{}'", version);
        return None;
    }
    Some(DepVersion::new(version))
}

/// Compare two version strings
pub fn compare_versions(current: &str, latest: &str) -> CompareResult {
    let Some(current_ver) = parse_candidate(current) else {
        warn!("Invalid version format: '{}'", current);
        return CompareResult::Invalid;
    };

    let Some(latest_ver) = parse_candidate(latest) else {
        warn!("Invalid version format: '{}'", latest);
        return CompareResult::Invalid;
    };

    current_ver.cmp(&latest_ver).into()
}

/// Keep only the valid, non-empty versions from a list of candidates (e.g. tags)
pub fn filter_valid(versions: &[String]) -> Vec<DepVersion> {
    versions.iter().filter_map(|v| parse_candidate(v)).collect()
}

/// Valid candidates in ascending order
pub fn sort_versions(versions: &[String]) -> Vec<DepVersion> {
    let mut parsed = filter_valid(versions);
    parsed.sort();
    parsed
}

/// Find the maximum version from a list
///
/// Returns the string as it appears in `versions` (including any `v` prefix).
/// Invalid versions are skipped.
pub fn find_max(versions: &[String], include_prereleases: bool) -> Option<String> {
    filter_valid(versions)
        .into_iter()
        .filter(|v| include_prereleases || !v.is_prerelease())
        .max()
        .map(|v| v.original().to_string())
}

/// Latest version among `available_versions` accepted by `same_line`,
/// if it is newer than `current_version`
fn calculate_latest_where<F>(
    current_version: &str,
    available_versions: &[String],
    same_line: F,
) -> Option<String>
where
    F: Fn(&DepVersion, &DepVersion) -> bool,
{
    let current = parse_candidate(current_version)?;

    let latest = filter_valid(available_versions)
        .into_iter()
        .filter(|v| same_line(v, &current))
        .max()?;

    if latest > current {
        Some(latest.to_string())
    } else {
        None
    }
}

/// Calculate the latest patch version within the same major.minor
///
/// Returns the latest patch version if a newer patch exists,
/// or None if the current version is already the latest patch.
pub fn calculate_latest_patch(
    current_version: &str,
    available_versions: &[String],
) -> Option<String> {
    calculate_latest_where(current_version, available_versions, |v, current| {
        v.major() == current.major() && v.minor() == current.minor()
    })
}

/// Calculate the latest minor version within the same major
///
/// Returns the latest minor.patch version if a newer minor exists,
/// or None if the current version is already the latest minor.
pub fn calculate_latest_minor(
    current_version: &str,
    available_versions: &[String],
) -> Option<String> {
    calculate_latest_where(current_version, available_versions, |v, current| {
        v.major() == current.major()
    })
}

/// Calculate the latest major version
///
/// Returns the latest version if a newer major version exists,
/// or None if the current version is already the latest.
pub fn calculate_latest_major(
    current_version: &str,
    available_versions: &[String],
) -> Option<String> {
    calculate_latest_where(current_version, available_versions, |_, _| true)
}

/// Convert into a canonical `semver::Version`, if representable.
///
/// Examples:
/// - "v1.2" -> 1.2.0
/// - "1.0.0.pre1" -> 1.0.0-pre1
/// - "v2.0.0+incompatible" -> 2.0.0
/// - "1.2.3.4" -> None (four release segments)
pub fn to_semver(version: &DepVersion) -> Option<Version> {
    if version.is_empty() || !DepVersion::is_valid(version.original()) {
        return None;
    }
    if version.release_len() > 3 {
        return None;
    }

    let mut semver = Version::new(version.major(), version.minor(), version.patch());
    if let Some(tag) = version.prerelease() {
        semver.pre = Prerelease::new(tag).ok()?;
    }
    Some(semver)
}
