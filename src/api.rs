use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::assistant::AssistantChain;
use crate::catalog::{self, Item};
use crate::config::StylistConfig;
use crate::context::{Context, Recommendation};
use crate::engine;
use crate::error::StylistError;
use crate::preferences::{Feedback, PreferenceStore, Preferences};
use crate::score::BreakpointTable;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StylistConfig>,
    pub breakpoints: Arc<BreakpointTable>,
    pub store: Arc<PreferenceStore>,
    pub assistant: Arc<AssistantChain>,
}

impl AppState {
    pub fn new(
        config: StylistConfig,
        breakpoints: BreakpointTable,
        assistant: AssistantChain,
    ) -> Self {
        let store = Arc::new(PreferenceStore::new(&config.preferences_path));
        Self {
            config: Arc::new(config),
            breakpoints: Arc::new(breakpoints),
            store,
            assistant: Arc::new(assistant),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/items", get(items))
        .route("/api/recommend", post(recommend))
        .route("/api/feedback", post(feedback))
        .route("/debug/preferences", get(debug_preferences))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, StylistError> {
    Ok(Json(catalog::load_catalog(&state.config.catalog_path)?))
}

#[derive(Serialize)]
struct RecommendResponse {
    #[serde(flatten)]
    recommendation: Recommendation,
    status: &'static str,
}

async fn recommend(
    State(state): State<AppState>,
    Json(context): Json<Context>,
) -> Result<Response, StylistError> {
    let recommendation = engine::recommend(
        &state.config,
        &state.breakpoints,
        &state.store,
        &state.assistant,
        context,
    )
    .await?;

    let source = recommendation.assistant_source;
    let mut resp = Json(RecommendResponse {
        recommendation,
        status: "success",
    })
    .into_response();
    resp.headers_mut().insert(
        HeaderName::from_static("x-assistant-source"),
        HeaderValue::from_static(source.as_str()),
    );
    Ok(resp)
}

#[derive(Deserialize)]
struct FeedbackRequest {
    item_id: String,
    feedback: Feedback,
}

#[derive(Serialize)]
struct FeedbackResponse {
    preferences: Preferences,
    status: &'static str,
}

async fn feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, StylistError> {
    let items = catalog::load_catalog(&state.config.catalog_path)?;
    let item = items
        .iter()
        .find(|i| i.id == req.item_id)
        .ok_or_else(|| StylistError::UnknownItem(req.item_id.clone()))?;

    let preferences = state.store.load()?;
    let updated = state.store.update(preferences, item, req.feedback)?;
    Ok(Json(FeedbackResponse {
        preferences: updated,
        status: "success",
    }))
}

async fn debug_preferences(
    State(state): State<AppState>,
) -> Result<Json<Preferences>, StylistError> {
    Ok(Json(state.store.load()?))
}
