//! Version normalization for recipe matching
//!
//! Recipe versions in Yocto builds and in the layer index are rarely strict
//! semver: they carry source-control suffixes (`+gitAUTOINC+...`), miss
//! components (`2.10`) or embed extra text (`1.1.1k`). This module turns them
//! into comparable values.
//!
//! # Modules
//!
//! - [`filter`]: Strips packaging suffixes from raw version strings
//! - [`semver`]: Coercion into `semver::Version` and the weighted distance metric
//! - [`error`]: Error types for version parsing

pub mod error;
pub mod filter;
pub mod semver;

pub use error::VersionError;
pub use filter::{filter_version_string, leading_segment};
pub use self::semver::{coerce, normalize, parse_distance, version_distance};
