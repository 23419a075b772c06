//! # Recommendation Engine
//! One blocking pipeline run: catalog → preferences → scores → assistant.
//!
//! The catalog and preference file are re-read on every run, so edits show
//! up without a restart. The assistant chain never fails, which keeps the
//! invariant that scores computed here always reach the caller even when
//! both backends are down.

use tracing::info;

use crate::assistant::{self, AssistantChain};
use crate::catalog;
use crate::config::StylistConfig;
use crate::context::{Context, Recommendation};
use crate::error::StylistError;
use crate::preferences::PreferenceStore;
use crate::score::{
    combine_scores, compute_membership_scores, compute_similarity_scores, BreakpointTable,
};

/// Run the full scoring-and-recommendation pipeline for one request.
pub async fn recommend(
    config: &StylistConfig,
    table: &BreakpointTable,
    store: &PreferenceStore,
    assistant: &AssistantChain,
    context: Context,
) -> Result<Recommendation, StylistError> {
    let items = catalog::load_catalog(&config.catalog_path)?;
    let preferences = store.load()?;

    let fuzzy = compute_membership_scores(&context, &items, table);
    let similarity = compute_similarity_scores(&context, &items);
    let combined = combine_scores(&fuzzy, &similarity, &preferences, &items, &config.weights);

    let prompt = assistant::build_prompt(&context, &combined, &preferences);
    let reply = assistant.request(&prompt).await;

    info!(
        items = items.len(),
        source = reply.source.as_str(),
        "recommendation pipeline finished"
    );

    Ok(Recommendation {
        context,
        fuzzy_scores: fuzzy,
        similarity_scores: similarity,
        combined_scores: combined,
        recommendation: reply.text,
        assistant_source: reply.source,
    })
}
