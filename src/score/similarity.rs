//! # Vector Similarity Scorer
//!
//! Encodes context and item attributes into fixed-length vectors via a
//! trigonometric feature map and scores each item by cosine similarity.

use std::f64::consts::PI;

use super::{round3, ScoreMap};
use crate::catalog::Item;
use crate::context::Context;

/// Phase constants of the feature map.
const ALPHA: f64 = PI;
const BETA: f64 = PI / 2.0;

/// Normalization scales for the two encoded attributes.
const TEMP_SCALE: f64 = 40.0;
const FORMALITY_SCALE: f64 = 10.0;

/// Embed `(temperature, formality)` into a 4-vector of unit-circle
/// coordinates. The norm is exactly sqrt(2) for any input, so cosine
/// denominators are never zero.
pub fn feature_map(temperature: f64, formality: f64) -> [f64; 4] {
    let tn = temperature / TEMP_SCALE;
    let fnorm = formality / FORMALITY_SCALE;
    [
        (ALPHA * tn).cos(),
        (ALPHA * tn).sin(),
        (BETA * fnorm).cos(),
        (BETA * fnorm).sin(),
    ]
}

/// Cosine similarity of two feature vectors.
pub fn cosine_similarity(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    assert!(
        norm_a > 0.0 && norm_b > 0.0,
        "zero-norm feature vector (norms {norm_a}, {norm_b})"
    );
    dot / (norm_a * norm_b)
}

/// Similarity of one item to the user context, rounded to 3 decimals.
pub fn similarity_score(context: &Context, item: &Item) -> f64 {
    let user = feature_map(context.temperature, context.formality);
    // TODO: confirm with product whether the item vector should encode the
    // item's own weather/temperature; today it reuses the request formality
    // on the temperature axis, matching the shipped behavior.
    let item_vec = feature_map(item.formality, context.formality);
    let s = cosine_similarity(&user, &item_vec);
    debug_assert!(
        (-1.0 - 1e-9..=1.0 + 1e-9).contains(&s),
        "cosine similarity {s} escaped [-1, 1]"
    );
    round3(s)
}

/// Similarity scores for the whole catalog, keyed by item id.
pub fn compute_similarity_scores(context: &Context, items: &[Item]) -> ScoreMap {
    items
        .iter()
        .map(|item| (item.id.clone(), similarity_score(context, item)))
        .collect()
}
