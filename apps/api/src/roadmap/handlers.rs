//! Axum route handlers for roadmap flows and stored roadmaps.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::roadmap::{AcademicYear, RoadmapRow};
use crate::roadmap::flow::{Background, FlowView, RoadmapFlow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartFlowRequest {
    pub quiz_session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SelectCareerRequest {
    pub career_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRoadmapRequest {
    #[serde(default)]
    pub current_skills: String,
    #[serde(default)]
    pub current_year: AcademicYear,
}

/// One card on the dashboard list.
#[derive(Debug, Serialize)]
pub struct RoadmapSummary {
    pub id: Uuid,
    pub career: String,
    pub current_year: String,
    pub months: usize,
    pub total_estimate: String,
    pub created_at: DateTime<Utc>,
}

impl From<RoadmapRow> for RoadmapSummary {
    fn from(row: RoadmapRow) -> Self {
        Self {
            id: row.id,
            career: row.career,
            current_year: row.current_year,
            months: row.roadmap.roadmap.len(),
            total_estimate: row.roadmap.0.total_estimate,
            created_at: row.created_at,
        }
    }
}

fn flow_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("roadmap flow {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Flow handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/flows
///
/// Requests career suggestions for the answers a submitted quiz session saved. The quiz
/// session is dropped once its flow exists. On failure no flow is created, the quiz
/// session stays available for a retry, and the error body redirects the client to the
/// quiz.
pub async fn handle_start_flow(
    State(state): State<AppState>,
    Json(request): Json<StartFlowRequest>,
) -> Result<(StatusCode, Json<FlowView>), AppError> {
    let quiz_id = request.quiz_session_id;
    let session = state
        .quizzes
        .get(quiz_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("quiz session {quiz_id} not found")))?;
    let submission = session.lock().await.submission().cloned().ok_or_else(|| {
        AppError::InvalidTransition(format!("quiz session {quiz_id} has not been submitted"))
    })?;

    let flow = RoadmapFlow::start(
        Some(submission.submission_id),
        &submission.answers,
        state.suggester.as_ref(),
        state.config.llm_timeout,
    )
    .await?;

    state.quizzes.remove(quiz_id).await;
    let flow_id = flow.id();
    let view = flow.view();
    state.flows.insert(flow_id, flow).await;
    info!(
        "Quiz session {quiz_id} handed off to roadmap flow {flow_id} ({} flows live)",
        state.flows.len().await
    );
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/flows/:id
///
/// Reports `generating` whenever another request holds the flow's lock. That includes
/// a quick `select` or `back`, not only a running generation.
pub async fn handle_get_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowView>, AppError> {
    let flow = state.flows.get(id).await.ok_or_else(|| flow_not_found(id))?;
    let view = match flow.try_lock() {
        Ok(flow) => flow.view(),
        Err(_) => FlowView::Generating {
            flow_id: id,
            career: None,
        },
    };
    Ok(Json(view))
}

/// POST /api/v1/flows/:id/select
pub async fn handle_select_career(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectCareerRequest>,
) -> Result<Json<FlowView>, AppError> {
    let flow = state.flows.get(id).await.ok_or_else(|| flow_not_found(id))?;
    let mut flow = flow.lock().await;
    flow.select_career(request.career_index)?;
    Ok(Json(flow.view()))
}

/// POST /api/v1/flows/:id/back
pub async fn handle_back_to_careers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowView>, AppError> {
    let flow = state.flows.get(id).await.ok_or_else(|| flow_not_found(id))?;
    let mut flow = flow.lock().await;
    flow.back_to_careers()?;
    Ok(Json(flow.view()))
}

/// POST /api/v1/flows/:id/generate
///
/// On failure the flow is back on `input` with the submitted background kept;
/// `GET /api/v1/flows/:id` shows it together with the error.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GenerateRoadmapRequest>,
) -> Result<Json<FlowView>, AppError> {
    let flow = state.flows.get(id).await.ok_or_else(|| flow_not_found(id))?;
    let mut flow = flow.lock().await;
    let background = Background {
        current_skills: request.current_skills,
        current_year: request.current_year,
    };
    flow.generate(
        background,
        state.generator.as_ref(),
        state.gateway.as_ref(),
        state.config.llm_timeout,
    )
    .await?;
    Ok(Json(flow.view()))
}

// ────────────────────────────────────────────────────────────────────────────
// Stored roadmap handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/roadmaps
///
/// Newest first.
pub async fn handle_list_roadmaps(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoadmapSummary>>, AppError> {
    let rows = state.gateway.list_roadmaps().await?;
    Ok(Json(rows.into_iter().map(RoadmapSummary::from).collect()))
}

/// GET /api/v1/roadmaps/:id
pub async fn handle_get_roadmap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoadmapRow>, AppError> {
    state
        .gateway
        .get_roadmap(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("roadmap {id} not found")))
}

/// DELETE /api/v1/roadmaps/:id
///
/// Removes the roadmap and all of its progress.
pub async fn handle_clear_roadmap(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.progress.clear(id).await?;
    info!("Roadmap {id} cleared by request");
    Ok(StatusCode::NO_CONTENT)
}
