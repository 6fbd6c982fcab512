use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("Not a version: {0:?}")]
    NotAVersion(String),

    #[error("Invalid version distance: {0:?} (expected an integer or major.minor.patch)")]
    InvalidDistance(String),
}
