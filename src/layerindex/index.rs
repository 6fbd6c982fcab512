//! In-memory lookup tables over layer index records

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::layerindex::types::{
    Branch, BranchId, Endpoint, Layer, LayerBranch, LayerBranchId, LayerId, OeRecipe,
};

/// Raw JSON records as returned by the layer index, one list per endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawIndexData {
    pub layers: Vec<Value>,
    pub layerbranches: Vec<Value>,
    pub branches: Vec<Value>,
    pub recipes: Vec<Value>,
}

impl RawIndexData {
    pub fn table(&self, endpoint: Endpoint) -> &[Value] {
        match endpoint {
            Endpoint::Layers => &self.layers,
            Endpoint::LayerBranches => &self.layerbranches,
            Endpoint::Branches => &self.branches,
            Endpoint::Recipes => &self.recipes,
        }
    }

    pub fn set_table(&mut self, endpoint: Endpoint, values: Vec<Value>) {
        match endpoint {
            Endpoint::Layers => self.layers = values,
            Endpoint::LayerBranches => self.layerbranches = values,
            Endpoint::Branches => self.branches = values,
            Endpoint::Recipes => self.recipes = values,
        }
    }
}

/// Number of records held by each table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub layers: usize,
    pub layerbranches: usize,
    pub branches: usize,
    pub recipe_names: usize,
    pub recipes: usize,
}

/// Read-only view of the layer index used for recipe matching
///
/// Layers, layerbranches and branches are keyed by id; recipes are grouped by
/// package name, keeping the order in which the registry returned them.
#[derive(Debug, Clone, Default)]
pub struct LayerIndex {
    layers: HashMap<LayerId, Layer>,
    layerbranches: HashMap<LayerBranchId, LayerBranch>,
    branches: HashMap<BranchId, Branch>,
    recipes: IndexMap<String, Vec<OeRecipe>>,
}

impl LayerIndex {
    /// Build the index from raw registry records.
    ///
    /// Never fails: a table containing a malformed record is logged and left empty.
    pub fn build(raw: RawIndexData) -> Self {
        let layers = decode_table::<Layer>(Endpoint::Layers, raw.layers);
        let layerbranches = decode_table::<LayerBranch>(Endpoint::LayerBranches, raw.layerbranches);
        let branches = decode_table::<Branch>(Endpoint::Branches, raw.branches);
        let recipes = decode_table::<OeRecipe>(Endpoint::Recipes, raw.recipes);

        Self::from_records(layers, layerbranches, branches, recipes)
    }

    /// Build the index from already decoded records
    pub fn from_records(
        layers: Vec<Layer>,
        layerbranches: Vec<LayerBranch>,
        branches: Vec<Branch>,
        recipes: Vec<OeRecipe>,
    ) -> Self {
        let mut grouped: IndexMap<String, Vec<OeRecipe>> = IndexMap::new();
        for recipe in recipes {
            grouped.entry(recipe.pn.clone()).or_default().push(recipe);
        }

        let index = Self {
            layers: layers.into_iter().map(|l| (l.id, l)).collect(),
            layerbranches: layerbranches.into_iter().map(|lb| (lb.id, lb)).collect(),
            branches: branches.into_iter().map(|b| (b.id, b)).collect(),
            recipes: grouped,
        };

        debug!("Built layer index: {:?}", index.stats());
        index
    }

    /// Layer referenced by a layerbranch, if both ids resolve
    pub fn layer_by_layerbranch_id(&self, id: LayerBranchId) -> Option<&Layer> {
        let layerbranch = self.layerbranches.get(&id)?;
        self.layers.get(&layerbranch.layer)
    }

    /// Branch referenced by a layerbranch, if both ids resolve
    pub fn branch_by_layerbranch_id(&self, id: LayerBranchId) -> Option<&Branch> {
        let layerbranch = self.layerbranches.get(&id)?;
        self.branches.get(&layerbranch.branch)
    }

    /// All recipes named `name`, in registry order
    pub fn recipes_by_name(&self, name: &str) -> &[OeRecipe] {
        self.recipes.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_recipe(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            layers: self.layers.len(),
            layerbranches: self.layerbranches.len(),
            branches: self.branches.len(),
            recipe_names: self.recipes.len(),
            recipes: self.recipes.values().map(Vec::len).sum(),
        }
    }
}

fn decode_table<T: DeserializeOwned>(endpoint: Endpoint, values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .unwrap_or_else(|e| {
            warn!("Cannot process {} table, using empty table: {}", endpoint.as_str(), e);
            Vec::new()
        })
}
