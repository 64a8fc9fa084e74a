//! Version handling for dep-style version strings
//!
//! This module provides validation, ordering, display and constraint
//! matching for versions as they appear in dep manifests, lock files and
//! repository tag lists.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ DepVersion  │◀────│ Constraint  │◀────│   Matcher   │
//! │ (parse/cmp) │     │  (clauses)  │     │ (resolver)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                                       │
//!        │                                       ▼
//!        │                                ┌─────────────┐
//!        └────────────────────────────────│   Semver    │
//!                                         │  (helpers)  │
//!                                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`dep`]: The `DepVersion` value type
//! - [`constraint`]: Constraint parsing and satisfaction
//! - [`matcher`]: Version matching trait consumed by a resolver
//! - [`semver`]: Candidate filtering, sorting and latest-version helpers
//! - [`error`]: Error types for the strict parsing paths

pub mod constraint;
pub mod dep;
pub mod error;
pub mod matcher;
pub mod semver;

pub use constraint::{Clause, Constraint, Op, Requirement};
pub use dep::DepVersion;
pub use error::{ConstraintError, VersionError};
pub use matcher::{DepVersionMatcher, VersionMatcher};
