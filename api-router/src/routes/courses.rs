use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate};
use common::{error::AppError, utils::fetcher::Endpoint};
use extraction_pipeline::{extract_schedule, fetch_schedule_document};
use serde::Deserialize;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

use super::require_user;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
pub struct DailyScheduleParams {
    #[serde(rename = "weiXinID")]
    pub user_id: Option<String>,
    pub date: Option<String>,
}

pub async fn daily_schedule(
    State(state): State<ApiState>,
    Query(params): Query<DailyScheduleParams>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = require_user(params.user_id.as_deref())?;
    let date = resolve_date(params.date.as_deref())?;
    info!(user_id, date = %date, "Daily schedule requested");

    let fetcher = state.fetcher.as_ref();
    let day = date.as_str();
    let schedule = state
        .cached(
            user_id,
            Endpoint::DailySchedule.label(),
            &[("date", day)],
            state.config.schedule_cache_ttl(),
            move || async move {
                let raw = fetch_schedule_document(fetcher, user_id, day).await?;
                extract_schedule(&raw)
            },
        )
        .await?;

    Ok(Json(schedule))
}

/// Today's local date when absent, otherwise a strictly formatted `YYYY-MM-DD`.
fn resolve_date(date: Option<&str>) -> Result<String, AppError> {
    let Some(date) = date.filter(|date| !date.is_empty()) else {
        return Ok(Local::now().format(DATE_FORMAT).to_string());
    };

    let well_formed =
        date.len() == 10 && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok();
    if well_formed {
        Ok(date.to_string())
    } else {
        Err(AppError::Validation(format!(
            "date must be formatted as YYYY-MM-DD, got `{date}`"
        )))
    }
}
