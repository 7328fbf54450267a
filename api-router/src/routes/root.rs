use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Service banner listing the data routes.
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "routes": [
            "/courses/daily",
            "/scores/info",
            "/scores/terms/valid",
            "/exams/schedule",
            "/cache/stats",
        ],
    }))
}

/// Answers as long as the runtime can schedule a handler. Never touches the portal.
pub async fn live() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "service": env!("CARGO_PKG_NAME")})),
    )
}
