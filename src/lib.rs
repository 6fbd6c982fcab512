//! Match Yocto/OpenEmbedded build recipes against the OpenEmbedded layer index.
//!
//! The [`layerindex`] module fetches and caches index snapshots, [`matching`]
//! selects the index recipe describing a build recipe, and [`version`] holds
//! the version filtering and distance helpers both rely on.

pub mod config;
pub mod layerindex;
pub mod logging;
pub mod matching;
pub mod recipe;
pub mod version;
