use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

pub async fn cache_stats(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.cache.stats().await)
}

pub async fn clear_cache(State(state): State<ApiState>) -> impl IntoResponse {
    let cleared = state.cache.clear().await;
    Json(json!({ "cleared": cleared }))
}
