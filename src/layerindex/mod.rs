//! OpenEmbedded layer index data
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Client    │────▶│   Loader    │◀────│  Snapshot   │
//! │  (fetch)    │     │ (fallbacks) │     │ cache/folder│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │ LayerIndex  │
//!                     │  (lookups)  │
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`]: Layer, branch, layerbranch and recipe records
//! - [`index`]: In-memory lookup tables built from raw records
//! - [`source`]: Trait for fetching raw endpoint records
//! - [`client`]: HTTP implementation of [`source::IndexSource`]
//! - [`cache`]: SQLite snapshot cache with refresh interval
//! - [`folder`]: JSON snapshot files in a user-supplied data folder
//! - [`loader`]: Combines the above into a [`index::LayerIndex`]
//! - [`error`]: Error types for fetching and caching

pub mod cache;
pub mod client;
pub mod error;
pub mod folder;
pub mod index;
pub mod loader;
pub mod source;
pub mod types;

pub use index::{IndexStats, LayerIndex, RawIndexData};
pub use loader::{IndexLoader, SnapshotOrigin};
pub use types::{Branch, Endpoint, Layer, LayerBranch, OeRecipe};
