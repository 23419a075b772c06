//! Request context and the recommendation payload returned by the API.

use serde::{Deserialize, Serialize};

use crate::assistant::AssistantSource;
use crate::score::ScoreMap;

/// User context for one scoring run. Constructed per request; the serde
/// defaults mirror the web form's placeholders so a partial body still
/// produces a sensible run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_formality")]
    pub formality: f64,
    #[serde(default = "default_mood")]
    pub mood: f64,
    #[serde(default = "default_occasion")]
    pub occasion: String,
}

fn default_temperature() -> f64 {
    20.0
}
fn default_formality() -> f64 {
    5.0
}
fn default_mood() -> f64 {
    5.0
}
fn default_occasion() -> String {
    "casual outing".to_string()
}

impl Default for Context {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            formality: default_formality(),
            mood: default_mood(),
            occasion: default_occasion(),
        }
    }
}

/// Full result of one pipeline run.
///
/// Every score map covers exactly the catalog's item ids. `recommendation`
/// is the assistant's raw reply text, passed through verbatim even when a
/// fallback path produced it; `assistant_source` says which path that was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub context: Context,
    pub fuzzy_scores: ScoreMap,
    pub similarity_scores: ScoreMap,
    pub combined_scores: ScoreMap,
    pub recommendation: String,
    pub assistant_source: AssistantSource,
}
