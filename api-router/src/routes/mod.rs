use common::error::AppError;

pub mod cache;
pub mod courses;
pub mod exams;
pub mod readiness;
pub mod root;
pub mod scores;

/// Trimmed `weiXinID`; missing or blank identifiers are rejected before any fetch.
fn require_user(raw: Option<&str>) -> Result<&str, AppError> {
    let user_id = raw.map(str::trim).unwrap_or_default();
    if user_id.is_empty() {
        return Err(AppError::Validation("weiXinID is required".to_string()));
    }
    Ok(user_id)
}
