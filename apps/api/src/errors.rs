use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::careers::suggester::SuggestionError;
use crate::db::PersistenceError;
use crate::roadmap::generator::RoadmapError;

/// Where the client is sent after a failed career suggestion.
pub const QUIZ_ENTRY_POINT: &str = "/quiz";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Career suggestion failed: {0}")]
    Suggestion(#[from] SuggestionError),

    #[error("Roadmap generation failed: {0}")]
    Roadmap(#[from] RoadmapError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, redirect) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::InvalidTransition(msg) => (
                StatusCode::CONFLICT,
                "INVALID_TRANSITION",
                msg.clone(),
                None,
            ),
            AppError::Suggestion(e) => {
                tracing::error!("Career suggestion error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    e.code(),
                    "Something went wrong generating career suggestions. Please retake the quiz."
                        .to_string(),
                    Some(QUIZ_ENTRY_POINT),
                )
            }
            AppError::Roadmap(e) => {
                tracing::error!("Roadmap generation error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    e.code(),
                    "Failed to generate roadmap. Your answers are kept, please try again."
                        .to_string(),
                    None,
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "Oops! Something went wrong saving your data. Please try again.".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(redirect) = redirect {
            error["redirect"] = json!(redirect);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
