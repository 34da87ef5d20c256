//! Axum route handlers for the Quiz API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::quiz::controller::{QuizSession, QuizView};
use crate::quiz::question_bank::{Question, QUESTION_BANK};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub option: String,
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("quiz session {id} not found"))
}

/// GET /api/v1/quiz/questions
pub async fn handle_list_questions() -> Json<&'static [Question]> {
    Json(QUESTION_BANK)
}

/// POST /api/v1/quiz/sessions
pub async fn handle_start_quiz(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<QuizView>), AppError> {
    let session = QuizSession::new(QUESTION_BANK, state.config.quiz_advance_delay)?;
    let view = session.view();
    state.quizzes.insert(session.id(), session).await;
    tracing::info!("Started quiz session {}", view.session_id);
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/quiz/sessions/:id
pub async fn handle_get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    let session = state.quizzes.get(id).await.ok_or_else(|| session_not_found(id))?;
    let view = session.lock().await.view();
    Ok(Json(view))
}

/// POST /api/v1/quiz/sessions/:id/answer
///
/// Answering the last question saves the quiz. The returned view then carries the
/// submission to hand to `POST /api/v1/flows`.
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<QuizView>, AppError> {
    let session = state.quizzes.get(id).await.ok_or_else(|| session_not_found(id))?;
    let mut session = session.lock().await;
    session.answer(&request.option, state.gateway.as_ref()).await?;
    Ok(Json(session.view()))
}

/// POST /api/v1/quiz/sessions/:id/back
///
/// A no-op on the first question.
pub async fn handle_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    let session = state.quizzes.get(id).await.ok_or_else(|| session_not_found(id))?;
    let mut session = session.lock().await;
    session.back();
    Ok(Json(session.view()))
}
