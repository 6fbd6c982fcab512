//! Record types returned by the OpenEmbedded layer index API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type LayerId = u64;
pub type BranchId = u64;
pub type LayerBranchId = u64;

/// Priority assigned to branches without a usable `sort_priority`
pub const WORST_BRANCH_PRIORITY: i64 = 999;

/// Endpoints of the layer index REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Layers,
    LayerBranches,
    Branches,
    Recipes,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Layers,
        Endpoint::LayerBranches,
        Endpoint::Branches,
        Endpoint::Recipes,
    ];

    /// Returns the string representation of the endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Layers => "layers",
            Endpoint::LayerBranches => "layerbranches",
            Endpoint::Branches => "branches",
            Endpoint::Recipes => "recipes",
        }
    }

    /// Path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Layers => "layerItems/",
            Endpoint::LayerBranches => "layerBranches/",
            Endpoint::Branches => "branches/",
            Endpoint::Recipes => "recipes/",
        }
    }

    /// Name of the snapshot file inside a data folder
    pub fn file_name(&self) -> &'static str {
        match self {
            Endpoint::Layers => "oe_layers.json",
            Endpoint::LayerBranches => "oe_layerbranches.json",
            Endpoint::Branches => "oe_branches.json",
            Endpoint::Recipes => "oe_recipes.json",
        }
    }
}

/// A layer (`layerItems` endpoint)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Ranking used to prefer higher quality layers (higher is better)
    pub index_preference: i64,
    #[serde(default)]
    pub vcs_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub layer_type: Option<String>,
}

/// A release branch (`branches` endpoint)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Branch {
    pub id: BranchId,
    #[serde(default)]
    pub name: Option<String>,
    /// Kept raw: the API has served numbers, numeric strings and null here
    #[serde(default)]
    pub sort_priority: Option<Value>,
}

impl Branch {
    /// Numeric sort priority (lower is better), or [`WORST_BRANCH_PRIORITY`]
    /// when the field is missing or not a non-negative integer.
    pub fn sort_priority(&self) -> i64 {
        match &self.sort_priority {
            Some(Value::Number(n)) => n.as_i64().filter(|p| *p >= 0),
            Some(Value::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
                s.parse::<i64>().ok()
            }
            _ => None,
        }
        .unwrap_or(WORST_BRANCH_PRIORITY)
    }
}

/// Link between a layer and a branch (`layerBranches` endpoint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LayerBranch {
    pub id: LayerBranchId,
    pub layer: LayerId,
    pub branch: BranchId,
}

/// A recipe known to the layer index (`recipes` endpoint)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OeRecipe {
    /// Package name
    pub pn: String,
    /// Package version
    pub pv: String,
    /// Package epoch, empty when unset
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pe: String,
    /// Package revision
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pr: String,
    pub layerbranch: LayerBranchId,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub srcrev: Option<String>,
}

impl OeRecipe {
    /// Version including the epoch, e.g. `1:2.3.4`
    pub fn full_version(&self) -> String {
        if self.pe.is_empty() {
            self.pv.clone()
        } else {
            format!("{}:{}", self.pe, self.pv)
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
