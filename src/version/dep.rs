//! dep version value type
//!
//! dep versions are semver-like strings with a few extra conventions:
//! - optional `v` prefix: v1.2.3
//! - +incompatible suffix: v2.0.0+incompatible (pre-go.mod v2+ modules)
//! - PHP-style prerelease separator: 1.0.0-pre1 (same ordering as 1.0.0.pre1)
//!
//! Validation, ordering and display are independent: any string can be
//! wrapped in a [`DepVersion`], `is_valid` reports whether it is well formed,
//! and the display form is always the input minus its leading `v`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::constraint::Constraint;
use crate::version::error::VersionError;

const INCOMPATIBLE_SUFFIX: &str = "+incompatible";

/// Matches `v?MAJOR[.MINOR[.PATCH]][(.|-)PRERELEASE][+incompatible]`
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Tag characters are anything but ASCII whitespace
    Regex::new(r"^v?[0-9]+(?:\.[0-9]+){0,2}(?:[.-][^ \t\n\x0B\f\r]+)?(?:\+incompatible)?$")
        .unwrap()
});

/// A version string as used by dep manifests and lock files
#[derive(Clone)]
pub struct DepVersion {
    original: String,
    key: ComparisonKey,
}

impl DepVersion {
    /// Wrap any string. Never fails; see [`DepVersion::is_valid`].
    pub fn new(raw: impl Into<String>) -> Self {
        let original = raw.into();
        let key = ComparisonKey::parse(&original);
        Self { original, key }
    }

    /// Strict constructor: rejects strings for which `is_valid` is false
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        if Self::is_valid(raw) {
            Ok(Self::new(raw))
        } else {
            Err(VersionError::Invalid(raw.to_string()))
        }
    }

    /// Whether `raw` is an acceptable dep version. The empty string is valid.
    pub fn is_valid(raw: &str) -> bool {
        raw.is_empty() || VERSION_RE.is_match(raw)
    }

    /// The exact text this version was built from
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The original text with one leading `v` removed
    pub fn as_str(&self) -> &str {
        self.original.strip_prefix('v').unwrap_or(&self.original)
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    pub fn is_incompatible(&self) -> bool {
        self.original.ends_with(INCOMPATIBLE_SUFFIX)
    }

    pub fn is_prerelease(&self) -> bool {
        matches!(&self.key, ComparisonKey::Version { pre: Some(_), .. })
    }

    /// Release segment at `index`, 0 when absent (so `1.2` has patch 0)
    pub fn segment(&self, index: usize) -> u64 {
        match &self.key {
            ComparisonKey::Version { release, .. } => release.get(index).copied().unwrap_or(0),
            ComparisonKey::Empty => 0,
        }
    }

    pub fn major(&self) -> u64 {
        self.segment(0)
    }

    pub fn minor(&self) -> u64 {
        self.segment(1)
    }

    pub fn patch(&self) -> u64 {
        self.segment(2)
    }

    /// Number of numeric release segments actually written
    pub fn release_len(&self) -> usize {
        match &self.key {
            ComparisonKey::Version { release, .. } => release.len(),
            ComparisonKey::Empty => 0,
        }
    }

    /// Prerelease tag as written, without its leading separator
    pub fn prerelease(&self) -> Option<&str> {
        if !self.is_prerelease() {
            return None;
        }
        let rest = strip_markers(&self.original);
        let mut consumed = 0;
        for _ in 0..self.release_len() {
            let digits = rest[consumed..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len() - consumed);
            consumed += digits;
            if rest[consumed..].starts_with(['.', '-']) {
                consumed += 1;
            }
        }
        Some(&rest[consumed..])
    }

    /// Check if this is a Go pseudo-version.
    ///
    /// Pseudo-version formats:
    /// - v0.0.0-YYYYMMDDHHMMSS-commit (no base version)
    /// - vX.Y.Z-0.YYYYMMDDHHMMSS-commit (with base version)
    pub fn is_pseudo_version(&self) -> bool {
        let normalized = strip_markers(&self.original);

        let Some((_, rest)) = normalized.split_once('-') else {
            return false;
        };

        let parts: Vec<&str> = rest.split('-').collect();
        if parts.len() < 2 {
            return false;
        }

        let timestamp = parts[0].strip_prefix("0.").unwrap_or(parts[0]);
        timestamp.len() == 14 && timestamp.chars().all(|c| c.is_ascii_digit())
    }

    /// Every clause of `constraint` holds for this version
    pub fn satisfies(&self, constraint: &Constraint) -> bool {
        constraint.is_satisfied_by(self)
    }
}

/// Strip the `v` prefix and `+incompatible` suffix, neither of which orders
fn strip_markers(raw: &str) -> &str {
    let raw = raw.strip_prefix('v').unwrap_or(raw);
    raw.strip_suffix(INCOMPATIBLE_SUFFIX).unwrap_or(raw)
}

/// Normalized form used only for ordering
#[derive(Debug, Clone)]
enum ComparisonKey {
    /// The empty version: no version info, below everything else
    Empty,
    Version {
        release: Vec<u64>,
        pre: Option<Vec<Identifier>>,
    },
}

/// One dot-separated prerelease identifier
///
/// Variant order matters: numeric identifiers sort below alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Identifier {
    Numeric(u64),
    Alphanumeric(String),
}

impl Identifier {
    fn parse(s: &str) -> Self {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse() {
                return Identifier::Numeric(n);
            }
        }
        Identifier::Alphanumeric(s.to_string())
    }
}

impl ComparisonKey {
    fn parse(raw: &str) -> Self {
        let s = strip_markers(raw);
        if s.is_empty() {
            return ComparisonKey::Empty;
        }

        let mut release = Vec::new();
        let mut rest = s;
        let pre = loop {
            let end = rest.find(['.', '-']).unwrap_or(rest.len());
            let segment = &rest[..end];
            let number = segment
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| segment.parse::<u64>().ok())
                .flatten();

            match number {
                Some(n) => release.push(n),
                // Non-numeric text before any release segment: one opaque tag
                None if release.is_empty() => {
                    break Some(vec![Identifier::Alphanumeric(rest.to_string())]);
                }
                None => break Some(Self::parse_prerelease(rest)),
            }

            match rest[end..].chars().next() {
                None => break None,
                Some('-') => break Some(Self::parse_prerelease(&rest[end + 1..])),
                Some(_) => rest = &rest[end + 1..],
            }
        };

        ComparisonKey::Version { release, pre }
    }

    fn parse_prerelease(tag: &str) -> Vec<Identifier> {
        tag.split('.').map(Identifier::parse).collect()
    }

    /// Release segments without trailing zeros, so `1.0` and `1.0.0` agree
    fn trimmed_release(release: &[u64]) -> &[u64] {
        let len = release.iter().rposition(|&n| n != 0).map_or(0, |i| i + 1);
        &release[..len]
    }
}

impl Ord for ComparisonKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let (
            ComparisonKey::Version { release: a, pre: a_pre },
            ComparisonKey::Version { release: b, pre: b_pre },
        ) = (self, other)
        else {
            return match (self, other) {
                (ComparisonKey::Empty, ComparisonKey::Empty) => Ordering::Equal,
                (ComparisonKey::Empty, _) => Ordering::Less,
                _ => Ordering::Greater,
            };
        };

        let len = a.len().max(b.len());
        let release = (0..len)
            .map(|i| {
                let x = a.get(i).copied().unwrap_or(0);
                let y = b.get(i).copied().unwrap_or(0);
                x.cmp(&y)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal);

        release.then_with(|| match (a_pre, b_pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(y),
        })
    }
}

impl PartialEq for ComparisonKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for ComparisonKey {}

impl PartialOrd for ComparisonKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for ComparisonKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ComparisonKey::Empty => 0u8.hash(state),
            ComparisonKey::Version { release, pre } => {
                1u8.hash(state);
                Self::trimmed_release(release).hash(state);
                pre.hash(state);
            }
        }
    }
}

impl PartialEq for DepVersion {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DepVersion {}

impl Ord for DepVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for DepVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for DepVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for DepVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DepVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepVersion({:?})", self.as_str())
    }
}

impl FromStr for DepVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for DepVersion {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// Serialized as the original string so lock files round-trip byte for byte
impl Serialize for DepVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for DepVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DepVersion::parse(&s).map_err(serde::de::Error::custom)
    }
}
