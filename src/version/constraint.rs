//! dep version constraints
//!
//! Supports dep constraint specifications:
//! - `1.2.3` - default (caret-like): >=1.2.3 <2.0.0 (or special cases for 0.x)
//! - `^1.2.3` - explicit caret (same as default)
//! - `~1.2.3` - tilde: >=1.2.3 <1.3.0
//! - `=1.2.3`, `!=1.2.3`, `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `*` - wildcards (`*` works in place of `x`)
//! - `1.0.0 - 2.0.0` - hyphen range: >=1.0.0 <=2.0.0
//! - `>=1.0.0, <2.0.0` or `>= 1.0.0 < 2.0.0` - AND, all must satisfy
//! - `^1.0.0 || ^2.0.0` - OR, any must satisfy
//!
//! Ordering always goes through [`DepVersion`]'s `Ord`, so `v` prefixes and
//! `+incompatible` suffixes never change the outcome.

use std::fmt;
use std::str::FromStr;

use crate::version::dep::DepVersion;
use crate::version::error::ConstraintError;

/// Comparison operator of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// ~1.2.3 means >=1.2.3 <1.3.0
    Tilde,
    /// ^1.2.3 means >=1.2.3 <2.0.0 (special handling for 0.x)
    Caret,
}

impl Op {
    /// Longest prefixes first so `>=` is not read as `>`
    const PREFIXES: [(&'static str, Op); 9] = [
        ("!=", Op::NotEq),
        (">=", Op::Gte),
        ("<=", Op::Lte),
        ("==", Op::Eq),
        ("=", Op::Eq),
        (">", Op::Gt),
        ("<", Op::Lt),
        ("~", Op::Tilde),
        ("^", Op::Caret),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Tilde => "~",
            Op::Caret => "^",
        }
    }

    /// Split a leading operator off `token`
    fn split_prefix(token: &str) -> (Option<Op>, &str) {
        // Pessimistic `~>` reads the same as tilde
        if let Some(rest) = token.strip_prefix("~>") {
            return (Some(Op::Tilde), rest);
        }
        Self::PREFIXES
            .iter()
            .find_map(|(prefix, op)| token.strip_prefix(*prefix).map(|rest| (Some(*op), rest)))
            .unwrap_or((None, token))
    }

    /// Whether `version` stands in this relation to `target`
    pub fn holds(&self, version: &DepVersion, target: &DepVersion) -> bool {
        match self {
            Op::Eq => version == target,
            Op::NotEq => version != target,
            Op::Gt => version > target,
            Op::Gte => version >= target,
            Op::Lt => version < target,
            Op::Lte => version <= target,
            Op::Tilde => {
                // ~1 only pins the major version
                version >= target
                    && version.major() == target.major()
                    && (target.release_len() < 2 || version.minor() == target.minor())
            }
            Op::Caret => {
                if version < target {
                    return false;
                }
                // ^1.2.3 -> >=1.2.3 <2.0.0
                // ^0.2.3 -> >=0.2.3 <0.3.0
                // ^0.0.3 -> >=0.0.3 <0.0.4
                // Unwritten segments are not pinned: ^0 -> <1.0.0, ^0.0 -> <0.1.0
                if target.major() != 0 || target.release_len() < 2 {
                    version.major() == target.major()
                } else if target.minor() != 0 || target.release_len() < 3 {
                    version.major() == 0 && version.minor() == target.minor()
                } else {
                    version.major() == 0
                        && version.minor() == 0
                        && version.patch() == target.patch()
                }
            }
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clause of a constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `op version`
    Compare { op: Op, version: DepVersion },
    /// `*` matches all versions
    Any,
    /// `1.x` means >=1.0.0 <2.0.0
    Major(u64),
    /// `1.2.x` means >=1.2.0 <1.3.0
    Minor(u64, u64),
}

impl Clause {
    pub fn new(op: Op, version: DepVersion) -> Self {
        Clause::Compare { op, version }
    }

    /// Parse a clause whose operator and operand are already separated
    fn parse_parts(op: Option<Op>, operand: &str) -> Result<Self, ConstraintError> {
        if is_wildcard(operand) {
            return match op {
                None | Some(Op::Eq) => parse_wildcard(operand),
                Some(_) => Err(ConstraintError::InvalidWildcard(operand.to_string())),
            };
        }

        if operand.is_empty() {
            let op = op.map_or("", |op| op.as_str());
            return Err(ConstraintError::MissingVersion(op.to_string()));
        }

        if !DepVersion::is_valid(operand) {
            return Err(ConstraintError::InvalidVersion(operand.to_string()));
        }

        // A bare version behaves like caret in dep
        Ok(Clause::new(op.unwrap_or(Op::Caret), DepVersion::new(operand)))
    }

    pub fn matches(&self, version: &DepVersion) -> bool {
        match self {
            Clause::Compare { op, version: target } => op.holds(version, target),
            Clause::Any => true,
            Clause::Major(major) => version.major() == *major,
            Clause::Minor(major, minor) => version.major() == *major && version.minor() == *minor,
        }
    }

    /// Version this clause is anchored at, for comparison against a latest version
    pub fn base_version(&self) -> Option<DepVersion> {
        match self {
            Clause::Compare { version, .. } => Some(version.clone()),
            Clause::Any => None,
            Clause::Major(major) => Some(DepVersion::new(format!("{}.0.0", major))),
            Clause::Minor(major, minor) => Some(DepVersion::new(format!("{}.{}.0", major, minor))),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Compare { op, version } => write!(f, "{}{}", op, version.original()),
            Clause::Any => f.write_str("*"),
            Clause::Major(major) => write!(f, "{}.x", major),
            Clause::Minor(major, minor) => write!(f, "{}.{}.x", major, minor),
        }
    }
}

fn is_wildcard_part(part: &str) -> bool {
    matches!(part, "*" | "x" | "X")
}

/// Whether `operand` ends in a wildcard part (`*`, `1.x`, `1.2.X`)
pub fn is_wildcard(operand: &str) -> bool {
    operand
        .rsplit('.')
        .next()
        .is_some_and(is_wildcard_part)
}

/// Parse wildcard patterns like "*", "1.x" or "v1.2.*"
fn parse_wildcard(operand: &str) -> Result<Clause, ConstraintError> {
    let invalid = || ConstraintError::InvalidWildcard(operand.to_string());
    let stripped = operand.strip_prefix('v').unwrap_or(operand);
    let parts: Vec<&str> = stripped.split('.').collect();

    match parts.as_slice() {
        [w] if is_wildcard_part(w) => Ok(Clause::Any),
        [major, w] if is_wildcard_part(w) => major
            .parse::<u64>()
            .map(Clause::Major)
            .map_err(|_| invalid()),
        [major, minor, w] if is_wildcard_part(w) => {
            let major = major.parse::<u64>().map_err(|_| invalid())?;
            // 1.x.x is the same as 1.x
            if is_wildcard_part(minor) {
                return Ok(Clause::Major(major));
            }
            let minor = minor.parse::<u64>().map_err(|_| invalid())?;
            Ok(Clause::Minor(major, minor))
        }
        _ => Err(invalid()),
    }
}

fn is_operator_only(token: &str) -> bool {
    let (op, rest) = Op::split_prefix(token);
    op.is_some() && rest.is_empty()
}

/// A set of clauses that must all hold (AND)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    clauses: Vec<Clause>,
}

impl Constraint {
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Parse a constraint specification (comma or space separated clauses)
    pub fn parse(spec: &str) -> Result<Self, ConstraintError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ConstraintError::Empty);
        }

        let mut tokens = spec
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .peekable();
        let mut clauses = Vec::new();

        while let Some(token) = tokens.next() {
            // ">= 1.0.0": operator and version may be separate tokens
            if is_operator_only(token) {
                let (op, _) = Op::split_prefix(token);
                let operand = tokens
                    .next()
                    .ok_or_else(|| ConstraintError::MissingVersion(token.to_string()))?;
                clauses.push(Clause::parse_parts(op, operand)?);
                continue;
            }

            let (op, operand) = Op::split_prefix(token);

            // Hyphen range: "1.0.0 - 2.0.0"
            if op.is_none() && tokens.next_if_eq(&"-").is_some() {
                let to = tokens
                    .next()
                    .ok_or_else(|| ConstraintError::MissingVersion("-".to_string()))?;
                clauses.push(Clause::parse_parts(Some(Op::Gte), operand)?);
                clauses.push(Clause::parse_parts(Some(Op::Lte), to)?);
                continue;
            }

            clauses.push(Clause::parse_parts(op, operand)?);
        }

        Ok(Self::from_clauses(clauses))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Check if a version satisfies all clauses
    pub fn is_satisfied_by(&self, version: &DepVersion) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }

    /// Get the base version from the first clause
    pub fn base_version(&self) -> Option<DepVersion> {
        self.clauses.first().and_then(Clause::base_version)
    }
}

impl FromStr for Constraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self.clauses.iter().map(ToString::to_string).collect();
        f.write_str(&clauses.join(", "))
    }
}

/// Alternatives separated by `||`, any of which may hold (OR)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    alternatives: Vec<Constraint>,
}

impl Requirement {
    pub fn parse(spec: &str) -> Result<Self, ConstraintError> {
        if spec.trim().is_empty() {
            return Err(ConstraintError::Empty);
        }

        let alternatives = spec
            .split("||")
            .map(Constraint::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { alternatives })
    }

    pub fn alternatives(&self) -> &[Constraint] {
        &self.alternatives
    }

    pub fn is_satisfied_by(&self, version: &DepVersion) -> bool {
        self.alternatives
            .iter()
            .any(|constraint| constraint.is_satisfied_by(version))
    }

    /// Base version of the first alternative
    pub fn base_version(&self) -> Option<DepVersion> {
        self.alternatives.first().and_then(Constraint::base_version)
    }
}

impl FromStr for Requirement {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Constraint> for Requirement {
    fn from(constraint: Constraint) -> Self {
        Self {
            alternatives: vec![constraint],
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternatives: Vec<String> = self.alternatives.iter().map(ToString::to_string).collect();
        f.write_str(&alternatives.join(" || "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", true)]
    #[case("1.0.0+incompatible", true)]
    #[case("0.9.0", false)]
    #[case("1.1.0-pre", true)]
    #[case("v1.1.0", true)]
    #[case("v0.9.0", false)]
    #[case("1.0.0-pre", false)]
    fn gte_constraint_is_satisfied_as_expected(#[case] version: &str, #[case] expected: bool) {
        let constraint = Constraint::parse(">= 1.0.0").unwrap();
        assert_eq!(DepVersion::new(version).satisfies(&constraint), expected);
    }

    #[rstest]
    #[case("=1.0.0", "v1.0.0", true)]
    #[case("==1.0.0", "1.0", true)]
    #[case("!=1.0.0", "1.0.1", true)]
    #[case("!=1.0.0", "1.0.0+incompatible", false)]
    #[case(">1.0.0", "1.0.0", false)]
    #[case("<1.0.0", "1.0.0-rc1", true)]
    #[case("<=1.0.0", "1.0.0", true)]
    #[case("<=1.0.0", "1.0.1", false)]
    fn comparison_operators_match_expected(
        #[case] spec: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let constraint = Constraint::parse(spec).unwrap();
        assert_eq!(constraint.is_satisfied_by(&DepVersion::new(version)), expected);
    }

    #[rstest]
    // ^1.2.3 matches >=1.2.3 <2.0.0
    #[case("^1.2.3", "1.9.9", true)]
    #[case("^1.2.3", "1.2.2", false)]
    #[case("^1.2.3", "2.0.0", false)]
    // ^0.2.3 matches >=0.2.3 <0.3.0
    #[case("^0.2.3", "0.2.9", true)]
    #[case("^0.2.3", "0.3.0", false)]
    // ^0.0.3 matches >=0.0.3 <0.0.4
    #[case("^0.0.3", "0.0.3", true)]
    #[case("^0.0.3", "0.0.4", false)]
    // bare version behaves like caret
    #[case("v1.2.3", "1.4.0", true)]
    #[case("1.2.3", "2.0.0", false)]
    // unwritten segments stay open
    #[case("^0", "0.5.0", true)]
    #[case("^0", "1.0.0", false)]
    #[case("^0.0", "0.0.7", true)]
    #[case("^0.0", "0.1.0", false)]
    #[case("^0.2", "0.2.9", true)]
    #[case("^1", "1.9.0", true)]
    #[case("0", "0.5.0", true)]
    #[case("0", "1.0.0", false)]
    fn caret_constraint_matches_expected(
        #[case] spec: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let constraint = Constraint::parse(spec).unwrap();
        assert_eq!(constraint.is_satisfied_by(&DepVersion::new(version)), expected);
    }

    #[rstest]
    #[case("~1.2.3", "1.2.9", true)]
    #[case("~1.2.3", "1.3.0", false)]
    #[case("~1.2.3", "1.2.2", false)]
    #[case("~1", "1.9.0", true)]
    #[case("~1", "2.0.0", false)]
    #[case("~> 1.2", "1.2.5", true)]
    fn tilde_constraint_matches_expected(
        #[case] spec: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let constraint = Constraint::parse(spec).unwrap();
        assert_eq!(constraint.is_satisfied_by(&DepVersion::new(version)), expected);
    }

    #[rstest]
    #[case("*", "0.0.1", true)]
    #[case("1.x", "1.9.0", true)]
    #[case("1.x", "2.0.0", false)]
    #[case("v1.2.*", "v1.2.7", true)]
    #[case("1.2.x", "1.3.0", false)]
    #[case("1.x.x", "1.3.0", true)]
    fn wildcard_constraint_matches_expected(
        #[case] spec: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let constraint = Constraint::parse(spec).unwrap();
        assert_eq!(constraint.is_satisfied_by(&DepVersion::new(version)), expected);
    }

    #[rstest]
    #[case(">=1.0.0, <2.0.0", "1.5.0", true)]
    #[case(">=1.0.0, <2.0.0", "2.0.0", false)]
    #[case(">= 1.0.0 < 2.0.0", "1.5.0", true)]
    #[case("1.0.0 - 2.0.0", "2.0.0", true)]
    #[case("1.0.0 - 2.0.0", "2.0.1", false)]
    #[case("1.0.0 - 2.0.0, !=1.5.0", "1.5.0", false)]
    #[case("1.0.0 - 2.0.0, !=1.5.0", "1.6.0", true)]
    #[case("!=1.5.0 1.0.0 - 2.0.0", "1.2.0", true)]
    #[case("!=1.5.0 1.0.0 - 2.0.0", "2.0.1", false)]
    fn compound_constraint_matches_expected(
        #[case] spec: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let constraint = Constraint::parse(spec).unwrap();
        assert_eq!(constraint.is_satisfied_by(&DepVersion::new(version)), expected);
    }

    #[rstest]
    #[case("^1.0.0 || ^2.0.0", "2.3.0", true)]
    #[case("^1.0.0 || ^2.0.0", "3.0.0", false)]
    #[case("<1.0.0 || >=2.0.0, <3.0.0", "2.5.0", true)]
    fn requirement_matches_any_alternative(
        #[case] spec: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        let requirement = Requirement::parse(spec).unwrap();
        assert_eq!(requirement.is_satisfied_by(&DepVersion::new(version)), expected);
    }

    #[rstest]
    #[case("", ConstraintError::Empty)]
    #[case("   ", ConstraintError::Empty)]
    #[case(">=", ConstraintError::MissingVersion(">=".to_string()))]
    #[case(">= va1.0.0", ConstraintError::InvalidVersion("va1.0.0".to_string()))]
    #[case("^not-a-version", ConstraintError::InvalidVersion("not-a-version".to_string()))]
    #[case(">=1.x", ConstraintError::InvalidWildcard("1.x".to_string()))]
    #[case("1.0.0 -", ConstraintError::MissingVersion("-".to_string()))]
    #[case("1.0.0 - 2.0.0 - 3.0.0", ConstraintError::InvalidVersion("-".to_string()))]
    #[case("a.b.x", ConstraintError::InvalidWildcard("a.b.x".to_string()))]
    fn parse_returns_error(#[case] spec: &str, #[case] expected: ConstraintError) {
        assert_eq!(Constraint::parse(spec), Err(expected));
    }

    #[test]
    fn requirement_parse_propagates_alternative_errors() {
        assert_eq!(
            Requirement::parse("^1.0.0 || "),
            Err(ConstraintError::Empty)
        );
    }

    #[rstest]
    #[case(">= 1.0.0", ">=1.0.0")]
    #[case("v1.2.3", "^v1.2.3")]
    #[case(">=1.0.0 <2.0.0", ">=1.0.0, <2.0.0")]
    #[case("1.x || ~2.1", "1.x || ~2.1")]
    fn display_returns_normalized_spec(#[case] spec: &str, #[case] expected: &str) {
        assert_eq!(Requirement::parse(spec).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("^1.2.3", Some("1.2.3"))]
    #[case("1.x", Some("1.0.0"))]
    #[case("1.2.x", Some("1.2.0"))]
    #[case("*", None)]
    #[case(">=1.0.0 || >=2.0.0", Some("1.0.0"))]
    fn base_version_returns_first_anchor(#[case] spec: &str, #[case] expected: Option<&str>) {
        let base = Requirement::parse(spec).unwrap().base_version();
        assert_eq!(base.map(|v| v.to_string()), expected.map(str::to_string));
    }
}
