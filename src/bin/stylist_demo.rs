//! Demo that runs the scoring pipeline once for a fixed context and prints
//! each score table plus the assistant reply.

use fashion_stylist::assistant::AssistantChain;
use fashion_stylist::config::StylistConfig;
use fashion_stylist::context::Context;
use fashion_stylist::engine;
use fashion_stylist::preferences::PreferenceStore;
use fashion_stylist::score::BreakpointTable;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let config = StylistConfig::load()?;
    let breakpoints = BreakpointTable::load(config.breakpoints_path.as_deref())?;
    let assistant = AssistantChain::from_config(&config.remote, &config.local);
    let store = PreferenceStore::new(&config.preferences_path);

    let context = Context {
        temperature: 20.0,
        formality: 5.0,
        mood: 6.0,
        occasion: "networking dinner".to_string(),
    };

    let rec = engine::recommend(&config, &breakpoints, &store, &assistant, context).await?;

    println!("\n===== FUZZY SCORES =====");
    for (id, score) in &rec.fuzzy_scores {
        println!("{id}: {score}");
    }

    println!("\n===== SIMILARITY SCORES =====");
    for (id, score) in &rec.similarity_scores {
        println!("{id}: {score}");
    }

    println!("\n===== COMBINED SCORES (Fuzzy + Similarity + Preference Bias) =====");
    for (id, score) in &rec.combined_scores {
        println!("{id}: {score}");
    }

    println!(
        "\n===== ASSISTANT REPLY ({}) =====\n{}",
        rec.assistant_source.as_str(),
        rec.recommendation
    );
    Ok(())
}
