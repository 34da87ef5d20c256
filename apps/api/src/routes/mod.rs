pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::progress::handlers as progress;
use crate::quiz::handlers as quiz;
use crate::roadmap::handlers as roadmap;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Quiz API
        .route("/api/v1/quiz/questions", get(quiz::handle_list_questions))
        .route("/api/v1/quiz/sessions", post(quiz::handle_start_quiz))
        .route("/api/v1/quiz/sessions/:id", get(quiz::handle_get_quiz))
        .route("/api/v1/quiz/sessions/:id/answer", post(quiz::handle_answer))
        .route("/api/v1/quiz/sessions/:id/back", post(quiz::handle_back))
        // Roadmap flow API
        .route("/api/v1/flows", post(roadmap::handle_start_flow))
        .route("/api/v1/flows/:id", get(roadmap::handle_get_flow))
        .route(
            "/api/v1/flows/:id/select",
            post(roadmap::handle_select_career),
        )
        .route(
            "/api/v1/flows/:id/back",
            post(roadmap::handle_back_to_careers),
        )
        .route("/api/v1/flows/:id/generate", post(roadmap::handle_generate))
        // Dashboard API
        .route("/api/v1/roadmaps", get(roadmap::handle_list_roadmaps))
        .route(
            "/api/v1/roadmaps/:id",
            get(roadmap::handle_get_roadmap).delete(roadmap::handle_clear_roadmap),
        )
        .route(
            "/api/v1/roadmaps/:id/progress",
            get(progress::handle_get_progress),
        )
        .route(
            "/api/v1/roadmaps/:id/progress/toggle",
            post(progress::handle_toggle_task),
        )
        .route(
            "/api/v1/roadmaps/:id/progress/reset",
            post(progress::handle_reset_progress),
        )
        .route(
            "/api/v1/roadmaps/:id/progress/events",
            get(progress::handle_progress_events),
        )
        .with_state(state)
}
