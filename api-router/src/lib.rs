use api_state::ApiState;
use axum::{
    extract::FromRef,
    routing::{delete, get},
    Router,
};
use routes::{
    cache::{cache_stats, clear_cache},
    courses::daily_schedule,
    exams::exam_schedule,
    readiness::ready,
    root::{index, live},
    scores::{score_info, valid_terms},
};

pub mod api_state;
pub mod error;
mod routes;


/// Portal data, cache administration and probe routes.
pub fn api_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probes and cache administration
    let service = Router::new()
        .route("/", get(index))
        .route("/ready", get(ready))
        .route("/live", get(live))
        .route("/cache/stats", get(cache_stats))
        .route("/cache", delete(clear_cache));

    let data = Router::new()
        .route("/courses/daily", get(daily_schedule))
        .route("/scores/info", get(score_info))
        .route("/scores/terms/valid", get(valid_terms))
        .route("/exams/schedule", get(exam_schedule));

    service.merge(data)
}
