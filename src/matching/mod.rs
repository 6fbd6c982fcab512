//! Recipe matching against the layer index
//!
//! # Modules
//!
//! - [`matcher`]: Exact and same-base-version selection with layer/branch tie-breaking
//! - [`nearest`]: Fallback to the closest previous version
//! - [`report`]: Serializable match results for output
//! - [`error`]: Reasons a recipe has no match

pub mod error;
pub mod matcher;
pub mod nearest;
pub mod report;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::NoMatch;
pub use matcher::{MatchKind, RecipeMatch, RecipeMatcher, match_recipe};
pub use nearest::find_nearest;
pub use report::MatchReport;
