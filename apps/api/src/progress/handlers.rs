//! Axum route handlers for the progress dashboard.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::{Stream, StreamExt};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::progress::TaskKey;
use crate::progress::hub::ProgressChange;
use crate::progress::store::ProgressView;
use crate::state::AppState;

/// GET /api/v1/roadmaps/:id/progress
pub async fn handle_get_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressView>, AppError> {
    Ok(Json(state.progress.view(id).await?))
}

/// POST /api/v1/roadmaps/:id/progress/toggle
///
/// Body: `{"month_index": 0, "category": "skill", "task_index": 2}`.
pub async fn handle_toggle_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(key): Json<TaskKey>,
) -> Result<Json<ProgressView>, AppError> {
    Ok(Json(state.progress.toggle(id, key).await?))
}

/// POST /api/v1/roadmaps/:id/progress/reset
pub async fn handle_reset_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressView>, AppError> {
    Ok(Json(state.progress.reset(id).await?))
}

fn to_event(change: &ProgressChange) -> Event {
    let name = match change {
        ProgressChange::Updated(_) => "updated",
        ProgressChange::Cleared { .. } => "cleared",
    };
    Event::default()
        .event(name)
        .json_data(change)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

/// GET /api/v1/roadmaps/:id/progress/events
///
/// Server-sent events: the current view first, then every change. The subscription
/// ends when the client disconnects.
pub async fn handle_progress_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Subscribe before reading so no change between the two is lost.
    let subscription = state.progress.subscribe(id);
    let current = state.progress.view(id).await?;
    debug!("Progress subscriber attached to roadmap {id}");

    let stream = tokio_stream::once(ProgressChange::Updated(current))
        .chain(subscription.into_stream())
        .map(|change| Ok(to_event(&change)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
