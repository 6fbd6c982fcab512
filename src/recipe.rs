//! Recipes being resolved against the layer index

use serde::{Deserialize, Serialize};

use crate::version::filter_version_string;

/// A recipe from a Yocto build, used as the lookup key for matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub name: String,
    /// Filtered version used for comparison
    pub version: String,
    /// Version as it appeared in the build, without the epoch
    pub orig_version: String,
    /// Epoch, empty when unset
    pub epoch: String,
    /// Layer the recipe was built from
    pub layer: String,
}

impl Recipe {
    /// Create a recipe from a build version of the form `[epoch:]version`
    pub fn new(name: impl Into<String>, version: &str, layer: impl Into<String>) -> Self {
        let (epoch, orig_version) = split_epoch(version.trim());

        Self {
            name: name.into(),
            version: filter_version_string(orig_version),
            orig_version: orig_version.to_string(),
            epoch: epoch.to_string(),
            layer: layer.into(),
        }
    }

    /// Original version including the epoch, e.g. `1:9.6p1`
    pub fn full_version(&self) -> String {
        if self.epoch.is_empty() {
            self.orig_version.clone()
        } else {
            format!("{}:{}", self.epoch, self.orig_version)
        }
    }
}

/// A recipe as listed in a batch input file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub layer: Option<String>,
}

impl From<RecipeEntry> for Recipe {
    fn from(entry: RecipeEntry) -> Self {
        Recipe::new(entry.name, &entry.version, entry.layer.unwrap_or_default())
    }
}

fn split_epoch(version: &str) -> (&str, &str) {
    match version.split_once(':') {
        Some((epoch, rest)) if !epoch.is_empty() && epoch.chars().all(|c| c.is_ascii_digit()) => {
            (epoch, rest)
        }
        _ => ("", version),
    }
}
