//! Record builders shared by matching tests

use serde_json::json;

use crate::layerindex::index::LayerIndex;
use crate::layerindex::types::{Branch, Layer, LayerBranch, OeRecipe};

pub fn layer(id: u64, name: &str, index_preference: i64) -> Layer {
    Layer {
        id,
        name: name.to_string(),
        index_preference,
        vcs_url: None,
        summary: None,
        layer_type: None,
    }
}

pub fn layerbranch(id: u64, layer: u64, branch: u64) -> LayerBranch {
    LayerBranch { id, layer, branch }
}

pub fn branch(id: u64, sort_priority: Option<i64>) -> Branch {
    Branch {
        id,
        name: None,
        sort_priority: sort_priority.map(|p| json!(p)),
    }
}

pub fn oe_recipe(pn: &str, pv: &str, pe: &str, layerbranch: u64) -> OeRecipe {
    OeRecipe {
        pn: pn.to_string(),
        pv: pv.to_string(),
        pe: pe.to_string(),
        pr: "r0".to_string(),
        layerbranch,
        summary: None,
        description: None,
        license: None,
        homepage: None,
        srcrev: None,
    }
}

pub fn index_of(
    layers: Vec<Layer>,
    layerbranches: Vec<LayerBranch>,
    branches: Vec<Branch>,
    recipes: Vec<OeRecipe>,
) -> LayerIndex {
    LayerIndex::from_records(layers, layerbranches, branches, recipes)
}
