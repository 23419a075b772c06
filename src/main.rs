//! Outfit Stylist Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use anyhow::Context as _;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fashion_stylist::api::{self, AppState};
use fashion_stylist::assistant::AssistantChain;
use fashion_stylist::config::StylistConfig;
use fashion_stylist::score::BreakpointTable;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fashion_stylist=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = StylistConfig::load().context("failed to load stylist config")?;
    let breakpoints = BreakpointTable::load(config.breakpoints_path.as_deref())
        .context("failed to load breakpoint tables")?;
    let assistant = AssistantChain::from_config(&config.remote, &config.local);

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, breakpoints, assistant);
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "stylist service listening");
    axum::serve(listener, router).await?;
    Ok(())
}
