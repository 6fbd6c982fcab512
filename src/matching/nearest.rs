//! Fallback matching on the closest previous version

use tracing::debug;

use crate::layerindex::index::LayerIndex;
use crate::layerindex::types::{Layer, OeRecipe};
use crate::matching::error::NoMatch;
use crate::matching::matcher::{MatchKind, RecipeMatch, describe};
use crate::recipe::Recipe;
use crate::version::{filter_version_string, normalize, version_distance};

/// Find the index recipe whose version is closest to, and strictly older than,
/// the recipe's version.
///
/// Candidates in unresolvable layers, with an empty `pv`, or whose version
/// cannot be normalized are skipped. The first candidate wins ties. A best
/// distance above `max_distance` is reported as [`NoMatch::DistanceExceeded`].
pub fn find_nearest<'a>(
    index: &'a LayerIndex,
    recipe: &Recipe,
    max_distance: i64,
) -> Result<RecipeMatch<'a>, NoMatch> {
    debug!(
        "Trying closest OE match for {}/{}",
        recipe.name, recipe.version
    );

    let target =
        normalize(&recipe.version).map_err(|_| NoMatch::NoVersion(recipe.version.clone()))?;

    let mut best: Option<(&'a OeRecipe, &'a Layer, i64)> = None;

    for oe_recipe in index.recipes_by_name(&recipe.name) {
        let Some(layer) = index.layer_by_layerbranch_id(oe_recipe.layerbranch) else {
            continue;
        };
        if oe_recipe.pv.is_empty() {
            continue;
        }
        let Ok(candidate) = normalize(&filter_version_string(&oe_recipe.pv)) else {
            continue;
        };

        let distance = version_distance(&target, &candidate);
        if distance > 0 && best.is_none_or(|(_, _, best_distance)| distance < best_distance) {
            best = Some((oe_recipe, layer, distance));
        }
    }

    let Some((oe_recipe, layer, distance)) = best else {
        return Err(NoMatch::NoPreviousVersion);
    };

    if distance > max_distance {
        return Err(NoMatch::DistanceExceeded {
            candidate: describe(oe_recipe, layer),
            distance,
            max: max_distance,
        });
    }

    Ok(RecipeMatch {
        recipe: oe_recipe,
        layer,
        kind: MatchKind::Nearest { distance },
    })
}
