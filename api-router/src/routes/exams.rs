use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use common::utils::fetcher::Endpoint;
use extraction_pipeline::{extract_exams, fetch_exam_document};
use serde::Deserialize;
use tracing::info;

use crate::{
    api_state::{term_qualifier, ApiState},
    error::ApiError,
};

use super::require_user;

#[derive(Debug, Deserialize)]
pub struct ExamParams {
    #[serde(rename = "weiXinID")]
    pub user_id: Option<String>,
    pub term: Option<String>,
}

pub async fn exam_schedule(
    State(state): State<ApiState>,
    Query(params): Query<ExamParams>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = require_user(params.user_id.as_deref())?;
    let term = params.term.as_deref();
    info!(user_id, term = term.unwrap_or("current"), "Exam arrangement requested");

    let fetcher = state.fetcher.as_ref();
    let exams = state
        .cached(
            user_id,
            Endpoint::ExamQuery.label(),
            &term_qualifier(term),
            state.config.exam_cache_ttl(),
            move || async move {
                let raw = fetch_exam_document(fetcher, user_id, term).await?;
                extract_exams(&raw)
            },
        )
        .await?;

    Ok(Json(exams))
}
