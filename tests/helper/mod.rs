//! Layer index fixtures shared by integration tests

use serde_json::{Value, json};

use oe_recipe_resolver::layerindex::{Endpoint, LayerIndex, RawIndexData};

/// Raw API payloads for a small index:
///
/// - layer 1 `openembedded-core` (preference 5) on branch 1 `master` (priority 1)
/// - layer 2 `meta-oe` (preference 3) on branch 1
/// - layer 1 again on branch 2 `kirkstone` (priority 5)
pub fn raw_tables() -> RawIndexData {
    let mut raw = RawIndexData::default();
    raw.set_table(Endpoint::Layers, layers());
    raw.set_table(Endpoint::LayerBranches, layerbranches());
    raw.set_table(Endpoint::Branches, branches());
    raw.set_table(Endpoint::Recipes, recipes());
    raw
}

pub fn index() -> LayerIndex {
    LayerIndex::build(raw_tables())
}

pub fn layers() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "openembedded-core",
            "index_preference": 5,
            "vcs_url": "https://git.openembedded.org/openembedded-core",
            "layer_type": "A"
        }),
        json!({ "id": 2, "name": "meta-oe", "index_preference": 3 }),
    ]
}

pub fn layerbranches() -> Vec<Value> {
    vec![
        json!({ "id": 11, "layer": 1, "branch": 1 }),
        json!({ "id": 21, "layer": 2, "branch": 1 }),
        json!({ "id": 12, "layer": 1, "branch": 2 }),
    ]
}

pub fn branches() -> Vec<Value> {
    vec![
        json!({ "id": 1, "name": "master", "sort_priority": 1 }),
        json!({ "id": 2, "name": "kirkstone", "sort_priority": 5 }),
    ]
}

pub fn recipes() -> Vec<Value> {
    vec![
        json!({ "pn": "zlib", "pv": "1.3.1", "pe": "", "pr": "r0", "layerbranch": 12, "license": "Zlib" }),
        json!({ "pn": "zlib", "pv": "1.3.1", "pe": "", "pr": "r0", "layerbranch": 11, "license": "Zlib" }),
        json!({ "pn": "zlib", "pv": "1.2.13", "pe": "", "pr": "r0", "layerbranch": 12 }),
        json!({ "pn": "openssh", "pv": "9.6p1", "pe": "1", "pr": "r0", "layerbranch": 11 }),
        json!({ "pn": "nano", "pv": "7.2", "pe": null, "pr": "r0", "layerbranch": 21 }),
        json!({ "pn": "busybox", "pv": "1.36.1+gitAUTOINC+abc", "pe": "", "pr": "r0", "layerbranch": 11 }),
    ]
}
