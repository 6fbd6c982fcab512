use thiserror::Error;

/// Why a recipe could not be matched against the layer index
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoMatch {
    #[error("Recipe does not exist in OE data")]
    NotInIndex,

    #[error("Cannot normalize recipe version {0:?}")]
    NoVersion(String),

    #[error("No close (previous) OE version match found")]
    NoPreviousVersion,

    #[error(
        "Closest OE version {candidate} is {distance} away, exceeding max version distance {max}"
    )]
    DistanceExceeded {
        candidate: String,
        distance: i64,
        max: i64,
    },
}
