//! Selection of the best layer index recipe for a build recipe

use serde::Serialize;
use tracing::debug;

use crate::layerindex::index::LayerIndex;
use crate::layerindex::types::{Branch, Layer, OeRecipe, WORST_BRANCH_PRIORITY};
use crate::matching::error::NoMatch;
use crate::matching::nearest::find_nearest;
use crate::recipe::Recipe;
use crate::version::{filter_version_string, leading_segment};

/// How a match was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchKind {
    /// Same epoch and version
    Exact,
    /// Same version before the first `+`/`-`
    SameBaseVersion,
    /// Closest older version
    Nearest { distance: i64 },
}

/// A layer index recipe selected for a build recipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecipeMatch<'a> {
    pub recipe: &'a OeRecipe,
    pub layer: &'a Layer,
    pub kind: MatchKind,
}

impl<'a> RecipeMatch<'a> {
    /// The matched record and its layer
    pub fn pair(&self) -> (&'a OeRecipe, &'a Layer) {
        (self.recipe, self.layer)
    }
}

/// Running best candidate of one selection strategy
struct Best<'a> {
    candidate: Option<(&'a OeRecipe, &'a Layer)>,
    layer_pref: i64,
    branch_priority: i64,
}

impl<'a> Best<'a> {
    fn new() -> Self {
        Self {
            candidate: None,
            layer_pref: -1,
            branch_priority: WORST_BRANCH_PRIORITY,
        }
    }

    fn record(&mut self, recipe: &'a OeRecipe, layer: &'a Layer, branch_priority: i64) {
        self.candidate = Some((recipe, layer));
        self.layer_pref = layer.index_preference;
        self.branch_priority = branch_priority;
    }

    fn into_match(self, kind: MatchKind) -> Option<RecipeMatch<'a>> {
        self.candidate
            .map(|(recipe, layer)| RecipeMatch { recipe, layer, kind })
    }
}

/// Matches build recipes against a [`LayerIndex`]
///
/// Matching is a pure function of the recipe and the index.
#[derive(Debug, Clone, Copy)]
pub struct RecipeMatcher<'a> {
    index: &'a LayerIndex,
    max_version_distance: i64,
}

impl<'a> RecipeMatcher<'a> {
    pub fn new(index: &'a LayerIndex, max_version_distance: i64) -> Self {
        Self {
            index,
            max_version_distance,
        }
    }

    /// Find the best index recipe for `recipe`.
    ///
    /// In a single pass over the index recipes sharing the name:
    /// - exact: epochs compatible, filtered versions equal, layer preference at
    ///   least the current best and branch priority strictly better
    /// - same base version (tracked only until an exact match is seen): equal
    ///   version before `+`/`-` and strictly higher layer preference
    ///
    /// Exact beats same base version. Without either, names present in the
    /// index fall back to [`find_nearest`].
    pub fn find(&self, recipe: &Recipe) -> Result<RecipeMatch<'a>, NoMatch> {
        if !self.index.contains_recipe(&recipe.name) {
            debug!(
                "Recipe {}: {}/{}/{} - Recipe does not exist in OE data",
                recipe.name,
                recipe.layer,
                recipe.name,
                recipe.full_version()
            );
            return Err(NoMatch::NotInIndex);
        }

        let mut exact = Best::new();
        let mut best_effort = Best::new();
        let recipe_base = leading_segment(&recipe.version);

        for oe_recipe in self.index.recipes_by_name(&recipe.name) {
            let Some(layer) = self.index.layer_by_layerbranch_id(oe_recipe.layerbranch) else {
                continue;
            };
            let branch_priority = self
                .index
                .branch_by_layerbranch_id(oe_recipe.layerbranch)
                .map_or(WORST_BRANCH_PRIORITY, Branch::sort_priority);
            let oe_version = filter_version_string(&oe_recipe.pv);

            if epochs_match(&recipe.epoch, &oe_recipe.pe)
                && oe_version == recipe.version
                && layer.index_preference >= exact.layer_pref
                && branch_priority < exact.branch_priority
            {
                exact.record(oe_recipe, layer, branch_priority);
            }

            if exact.candidate.is_none()
                && leading_segment(&oe_version) == recipe_base
                && layer.index_preference > best_effort.layer_pref
                && !oe_version.is_empty()
            {
                best_effort.record(oe_recipe, layer, branch_priority);
            }
        }

        let found = exact
            .into_match(MatchKind::Exact)
            .or_else(|| best_effort.into_match(MatchKind::SameBaseVersion));

        match found {
            Some(found) => {
                debug!(
                    "Recipe {}: {}/{}/{} - OE match {} ({:?})",
                    recipe.name,
                    recipe.layer,
                    recipe.name,
                    recipe.full_version(),
                    describe(found.recipe, found.layer),
                    found.kind
                );
                Ok(found)
            }
            None => self.find_nearest(recipe),
        }
    }

    /// Closest older version of `recipe` in the index
    pub fn find_nearest(&self, recipe: &Recipe) -> Result<RecipeMatch<'a>, NoMatch> {
        let result = find_nearest(self.index, recipe, self.max_version_distance);

        match &result {
            Ok(found) => debug!(
                "Recipe {}: {}/{}/{} - OE near match {} - (Distance {})",
                recipe.name,
                recipe.layer,
                recipe.name,
                recipe.full_version(),
                describe(found.recipe, found.layer),
                match found.kind {
                    MatchKind::Nearest { distance } => distance,
                    _ => 0,
                }
            ),
            Err(reason) => debug!(
                "Recipe {}: {}/{}/{} - {}",
                recipe.name,
                recipe.layer,
                recipe.name,
                recipe.full_version(),
                reason
            ),
        }

        result
    }
}

/// Match `recipe` against `index`, returning the matched record and its layer.
///
/// Both are `None` when nothing qualifies; the reason is logged.
pub fn match_recipe<'a>(
    recipe: &Recipe,
    index: &'a LayerIndex,
    max_version_distance: i64,
) -> (Option<&'a OeRecipe>, Option<&'a Layer>) {
    match RecipeMatcher::new(index, max_version_distance).find(recipe) {
        Ok(found) => {
            let (recipe, layer) = found.pair();
            (Some(recipe), Some(layer))
        }
        Err(reason) => {
            debug!("No OE match for {}: {}", recipe.name, reason);
            (None, None)
        }
    }
}

/// Epochs only conflict when both are set and differ
fn epochs_match(recipe_epoch: &str, oe_epoch: &str) -> bool {
    recipe_epoch.is_empty() || oe_epoch.is_empty() || recipe_epoch == oe_epoch
}

/// `layer/name/[epoch:]version-revision`, as used in log messages
pub(crate) fn describe(recipe: &OeRecipe, layer: &Layer) -> String {
    format!(
        "{}/{}/{}-{}",
        layer.name,
        recipe.pn,
        recipe.full_version(),
        recipe.pr
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::test_support::{branch, index_of, layer, layerbranch, oe_recipe};
    use rstest::rstest;

    const NO_DISTANCE: i64 = 0;

    /// Layerbranches:
    /// - lb 10: openembedded-core (pref 5) on master (priority 1)
    /// - lb 20: meta-oe (pref 3) on kirkstone (priority 2)
    /// - lb 30: meta-vendor (pref 5) on a branch without priority
    /// - lb 40: layer id 99, which does not exist
    /// - lb 50: meta-extra (pref 4) on branch id 777, which does not exist
    fn fixture(recipes: Vec<OeRecipe>) -> LayerIndex {
        index_of(
            vec![
                layer(1, "openembedded-core", 5),
                layer(2, "meta-oe", 3),
                layer(3, "meta-vendor", 5),
                layer(4, "meta-extra", 4),
            ],
            vec![
                layerbranch(10, 1, 100),
                layerbranch(20, 2, 200),
                layerbranch(30, 3, 300),
                layerbranch(40, 99, 100),
                layerbranch(50, 4, 777),
            ],
            vec![branch(100, Some(1)), branch(200, Some(2)), branch(300, None)],
            recipes,
        )
    }

    fn find<'a>(index: &'a LayerIndex, recipe: &Recipe) -> Result<RecipeMatch<'a>, NoMatch> {
        RecipeMatcher::new(index, NO_DISTANCE).find(recipe)
    }

    #[rstest]
    #[case(vec![("1.2.0", 10), ("1.2.0", 20)])]
    #[case(vec![("1.2.0", 20), ("1.2.0", 10)])]
    fn exact_match_prefers_layer_preference_and_branch_priority(#[case] candidates: Vec<(&str, u64)>) {
        let index = fixture(
            candidates
                .into_iter()
                .map(|(pv, lb)| oe_recipe("foo", pv, "", lb))
                .collect(),
        );

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::Exact);
        assert_eq!(found.layer.name, "openembedded-core");
    }

    #[test]
    fn exact_match_keeps_earlier_candidate_when_branch_priority_is_not_better() {
        // meta-oe first; openembedded-core has the higher preference but a
        // worse branch, so it cannot replace the earlier exact match
        let index = index_of(
            vec![layer(1, "openembedded-core", 5), layer(2, "meta-oe", 3)],
            vec![layerbranch(10, 1, 200), layerbranch(20, 2, 100)],
            vec![branch(100, Some(1)), branch(200, Some(2))],
            vec![oe_recipe("foo", "1.2.0", "", 20), oe_recipe("foo", "1.2.0", "", 10)],
        );

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::Exact);
        assert_eq!(found.layer.name, "meta-oe");
    }

    #[test]
    fn exact_match_keeps_first_of_identical_candidates() {
        let mut first = oe_recipe("foo", "1.2.0", "", 10);
        first.pr = "r1".to_string();
        let index = fixture(vec![first, oe_recipe("foo", "1.2.0", "", 10)]);

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.recipe.pr, "r1");
    }

    #[test]
    fn exact_match_requires_a_branch_priority() {
        // a branch without sort_priority ranks 999, which never beats the
        // initial threshold
        let index = fixture(vec![oe_recipe("foo", "1.2.0", "", 30)]);

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::SameBaseVersion);
        assert_eq!(found.layer.name, "meta-vendor");
    }

    #[test]
    fn unresolved_branch_ranks_worst_but_is_still_considered() {
        let index = fixture(vec![oe_recipe("foo", "1.2.0", "", 50)]);

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::SameBaseVersion);
        assert_eq!(found.layer.name, "meta-extra");
        assert_eq!(found.recipe.layerbranch, 50);
    }

    #[test]
    fn unresolved_branch_loses_exact_match_to_resolved_branch() {
        let index = fixture(vec![
            oe_recipe("foo", "1.2.0", "", 50),
            oe_recipe("foo", "1.2.0", "", 20),
        ]);

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::Exact);
        assert_eq!(found.layer.name, "meta-oe");
    }

    #[test]
    fn exact_match_compares_filtered_versions() {
        let index = fixture(vec![oe_recipe("foo", "1.2.0+gitAUTOINC+abcdef", "", 10)]);

        let found = find(&index, &Recipe::new("foo", "1.2.0+git999", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn epoch_mismatch_excludes_exact_match() {
        let index = fixture(vec![oe_recipe("foo", "1.2.0", "2", 10)]);

        let found = find(&index, &Recipe::new("foo", "1:1.2.0", "meta")).unwrap();

        assert_ne!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn epoch_mismatch_lets_another_candidate_match_exactly() {
        let index = fixture(vec![
            oe_recipe("foo", "1.2.0", "2", 10),
            oe_recipe("foo", "1.2.0", "1", 20),
        ]);

        let found = find(&index, &Recipe::new("foo", "1:1.2.0", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::Exact);
        assert_eq!(found.recipe.pe, "1");
    }

    #[rstest]
    #[case("", "3")]
    #[case("3", "")]
    #[case("3", "3")]
    fn missing_or_equal_epochs_are_compatible(#[case] recipe_epoch: &str, #[case] oe_epoch: &str) {
        assert!(epochs_match(recipe_epoch, oe_epoch));
    }

    #[test]
    fn best_effort_matches_same_base_version_with_highest_preference() {
        let index = fixture(vec![
            oe_recipe("foo", "1.2.0-r5", "", 20),
            oe_recipe("foo", "1.2.0+dfsg", "", 10),
            oe_recipe("foo", "1.3.0", "", 10),
        ]);

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::SameBaseVersion);
        assert_eq!(found.recipe.pv, "1.2.0+dfsg");
    }

    #[test]
    fn best_effort_keeps_first_of_equal_preference() {
        let index = fixture(vec![
            oe_recipe("foo", "1.2.0-a", "", 10),
            oe_recipe("foo", "1.2.0-b", "", 30),
        ]);

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.recipe.pv, "1.2.0-a");
    }

    #[test]
    fn exact_match_wins_over_earlier_best_effort_candidate() {
        let index = fixture(vec![
            oe_recipe("foo", "1.2.0+dfsg", "", 10),
            oe_recipe("foo", "1.2.0", "", 20),
        ]);

        let found = find(&index, &Recipe::new("foo", "1.2.0", "meta")).unwrap();

        assert_eq!(found.kind, MatchKind::Exact);
        assert_eq!(found.layer.name, "meta-oe");
    }

    #[test]
    fn best_effort_ignores_empty_candidate_versions() {
        // "git" filters to an empty version, as does the recipe's "+git"; the
        // branch has no priority so the exact pass cannot take it either
        let index = fixture(vec![oe_recipe("foo", "git", "", 30)]);

        let result = find(&index, &Recipe::new("foo", "+git", "meta"));

        assert_eq!(result, Err(NoMatch::NoVersion(String::new())));
    }

    #[test]
    fn unresolved_layers_are_skipped() {
        let index = fixture(vec![
            oe_recipe("foo", "1.2.0", "", 40),
            oe_recipe("foo", "1.2.0", "", 999),
        ]);

        let result = find(&index, &Recipe::new("foo", "1.2.0", "meta"));

        assert_eq!(result, Err(NoMatch::NoPreviousVersion));
    }

    #[test]
    fn unknown_name_is_not_in_index() {
        let index = fixture(vec![oe_recipe("foo", "1.0.0", "", 10)]);

        let result = RecipeMatcher::new(&index, i64::MAX).find(&Recipe::new("bar", "2.0.0", "meta"));

        assert_eq!(result, Err(NoMatch::NotInIndex));
    }

    #[test]
    fn falls_back_to_nearest_version() {
        let index = fixture(vec![
            oe_recipe("foo", "1.5.0", "", 10),
            oe_recipe("foo", "1.9.0", "", 20),
            oe_recipe("foo", "2.1.0", "", 10),
        ]);
        let matcher = RecipeMatcher::new(&index, 10_000);

        let found = matcher.find(&Recipe::new("foo", "2.0.0", "meta")).unwrap();

        assert_eq!(found.recipe.pv, "1.9.0");
        assert_eq!(found.kind, MatchKind::Nearest { distance: 9100 });
    }

    #[test]
    fn nearest_fallback_respects_max_distance() {
        let index = fixture(vec![oe_recipe("foo", "1.9.0", "", 10)]);

        let result = find(&index, &Recipe::new("foo", "2.0.0", "meta"));

        assert!(matches!(
            result,
            Err(NoMatch::DistanceExceeded { distance: 9100, max: NO_DISTANCE, .. })
        ));
    }

    #[test]
    fn matching_is_repeatable() {
        let index = fixture(vec![
            oe_recipe("foo", "1.2.0", "", 20),
            oe_recipe("foo", "1.2.0", "", 10),
            oe_recipe("foo", "1.1.0", "", 10),
        ]);
        let matcher = RecipeMatcher::new(&index, 10_000);
        let recipe = Recipe::new("foo", "1.2.0", "meta");

        assert_eq!(matcher.find(&recipe), matcher.find(&recipe));
    }

    #[test]
    fn match_recipe_returns_record_and_layer_pair() {
        let index = fixture(vec![oe_recipe("foo", "1.2.0", "", 10)]);

        let (found, layer) = match_recipe(&Recipe::new("foo", "1.2.0", "meta"), &index, 0);
        assert_eq!(found.map(|r| r.pv.as_str()), Some("1.2.0"));
        assert_eq!(layer.map(|l| l.name.as_str()), Some("openembedded-core"));

        let (found, layer) = match_recipe(&Recipe::new("bar", "1.2.0", "meta"), &index, 0);
        assert!(found.is_none());
        assert!(layer.is_none());
    }

    #[test]
    fn describe_formats_layer_name_and_versions() {
        let index = fixture(vec![]);
        let mut recipe = oe_recipe("openssh", "9.6p1", "1", 10);
        recipe.pr = "r2".to_string();
        let layer = index.layer_by_layerbranch_id(10).unwrap();

        assert_eq!(describe(&recipe, layer), "openembedded-core/openssh/1:9.6p1-r2");
    }
}
