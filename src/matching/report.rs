//! Serializable outcome of matching one recipe

use serde::Serialize;

use crate::matching::error::NoMatch;
use crate::matching::matcher::{MatchKind, RecipeMatch};
use crate::recipe::Recipe;

/// Match status of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    Unmatched,
}

/// Details of the matched layer index recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRecipe {
    pub layer: String,
    pub layer_vcs_url: Option<String>,
    pub name: String,
    pub version: String,
    pub revision: String,
    pub kind: MatchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srcrev: Option<String>,
}

impl From<&RecipeMatch<'_>> for MatchedRecipe {
    fn from(found: &RecipeMatch<'_>) -> Self {
        let recipe = found.recipe;
        Self {
            layer: found.layer.name.clone(),
            layer_vcs_url: found.layer.vcs_url.clone(),
            name: recipe.pn.clone(),
            version: recipe.full_version(),
            revision: recipe.pr.clone(),
            kind: found.kind,
            summary: recipe.summary.clone(),
            description: recipe.description.clone(),
            license: recipe.license.clone(),
            homepage: recipe.homepage.clone(),
            srcrev: recipe.srcrev.clone(),
        }
    }
}

/// Report line for one build recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub name: String,
    pub version: String,
    pub layer: String,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oe_match: Option<MatchedRecipe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MatchReport {
    pub fn new(recipe: &Recipe, result: &Result<RecipeMatch<'_>, NoMatch>) -> Self {
        let (status, oe_match, reason) = match result {
            Ok(found) => (MatchStatus::Matched, Some(MatchedRecipe::from(found)), None),
            Err(reason) => (MatchStatus::Unmatched, None, Some(reason.to_string())),
        };

        Self {
            name: recipe.name.clone(),
            version: recipe.full_version(),
            layer: recipe.layer.clone(),
            status,
            oe_match,
            reason,
        }
    }
}
