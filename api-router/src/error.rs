use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("Upstream error: {message}")]
    UpstreamError { message: String, status: u16 },
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Transport { message, status } => {
                tracing::warn!(?status, "Upstream portal error: {message}");
                Self::UpstreamError {
                    message,
                    status: status
                        .filter(|code| (400..600).contains(code))
                        .unwrap_or(StatusCode::BAD_GATEWAY.as_u16()),
                }
            }
            AppError::Extraction(msg) => {
                tracing::error!("Extraction failed: {msg}");
                Self::ExtractionError(msg)
            }
            AppError::Validation(msg) => Self::ValidationError(msg),
            AppError::Config(_) | AppError::Io(_) | AppError::InternalError(_) => {
                tracing::error!("Internal error: {:?}", err);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InternalError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            Self::ValidationError(message) | Self::ExtractionError(message) => {
                (StatusCode::BAD_REQUEST, message)
            }
            Self::UpstreamError { message, status } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                status: "error".to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    status: String,
}
