//! # Score Combiner
//!
//! Blends the two scorers' outputs with the stored per-color preference
//! bonus into one normalized suitability score per item. The blend weights
//! live in `ScoreWeights` (configuration, not literals); with non-negative
//! weights the result is bounded below by 0, and a ceiling clamp keeps it
//! at or under 1.

use super::{round3, ScoreMap};
use crate::catalog::Item;
use crate::config::ScoreWeights;
use crate::preferences::Preferences;

/// Blend fuzzy and similarity maps, adding the color-affinity bonus where
/// the item's color has a stored preference. Output keys mirror `items`.
pub fn combine_scores(
    fuzzy: &ScoreMap,
    similarity: &ScoreMap,
    preferences: &Preferences,
    items: &[Item],
    weights: &ScoreWeights,
) -> ScoreMap {
    let mut combined = ScoreMap::new();
    for item in items {
        let f = fuzzy.get(&item.id).copied().unwrap_or(0.0);
        let s = similarity.get(&item.id).copied().unwrap_or(0.0);
        let mut base = weights.membership * f + weights.similarity * s;
        if let Some(affinity) = preferences.preferred_colors.get(&item.color) {
            base += weights.color_bias * affinity;
        }
        combined.insert(item.id.clone(), round3(base.min(1.0)));
    }
    combined
}
