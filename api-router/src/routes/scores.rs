use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use common::utils::fetcher::Endpoint;
use extraction_pipeline::{extract_scores, fetch_score_document};
use serde::Deserialize;
use tracing::info;

use crate::{
    api_state::{term_qualifier, ApiState, VALID_TERMS_LABEL},
    error::ApiError,
};

use super::require_user;

#[derive(Debug, Deserialize)]
pub struct ScoreParams {
    #[serde(rename = "weiXinID")]
    pub user_id: Option<String>,
    pub term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidTermsParams {
    #[serde(rename = "weiXinID")]
    pub user_id: Option<String>,
}

pub async fn score_info(
    State(state): State<ApiState>,
    Query(params): Query<ScoreParams>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = require_user(params.user_id.as_deref())?;
    let term = params.term.as_deref();
    info!(user_id, term = term.unwrap_or("current"), "Scores requested");

    let fetcher = state.fetcher.as_ref();
    let scores = state
        .cached(
            user_id,
            Endpoint::ScoreQuery.label(),
            &term_qualifier(term),
            state.config.score_cache_ttl(),
            move || async move {
                let raw = fetch_score_document(fetcher, user_id, term).await?;
                extract_scores(&raw)
            },
        )
        .await?;

    Ok(Json(scores))
}

pub async fn valid_terms(
    State(state): State<ApiState>,
    Query(params): Query<ValidTermsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = require_user(params.user_id.as_deref())?;
    info!(user_id, "Valid terms requested");

    let discovery = &state.discovery;
    let terms = state
        .cached(
            user_id,
            VALID_TERMS_LABEL,
            &[],
            state.config.valid_terms_cache_ttl(),
            move || discovery.discover_valid_terms(user_id),
        )
        .await?;

    Ok(Json(terms))
}
