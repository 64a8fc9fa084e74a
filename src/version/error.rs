use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version: '{0}'")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Empty constraint")]
    Empty,

    #[error("Operator '{0}' is missing a version")]
    MissingVersion(String),

    #[error("Invalid version in constraint: '{0}'")]
    InvalidVersion(String),

    #[error("Invalid wildcard: '{0}'")]
    InvalidWildcard(String),
}
