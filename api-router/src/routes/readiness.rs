use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: returns 200 when the portal base url is usable, else 503.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    let cache = state.cache.stats().await;
    let base = state.config.portal_base_url.as_str();
    let portal_ok = base.starts_with("https://") || base.starts_with("http://");

    if portal_ok {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "portal": "ok", "cache_entries": cache.active_entries }
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "portal": "fail" },
                "reason": format!("portal base url `{base}` is not an http(s) url")
            })),
        )
    }
}
