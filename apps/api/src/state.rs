use std::sync::Arc;

use crate::careers::suggester::CareerSuggester;
use crate::config::Config;
use crate::db::PersistenceGateway;
use crate::progress::store::ProgressStore;
use crate::quiz::controller::QuizSession;
use crate::roadmap::flow::RoadmapFlow;
use crate::roadmap::generator::RoadmapGenerator;
use crate::sessions::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn PersistenceGateway>,
    pub suggester: Arc<dyn CareerSuggester>,
    pub generator: Arc<dyn RoadmapGenerator>,
    pub progress: Arc<ProgressStore>,
    pub quizzes: SessionRegistry<QuizSession>,
    pub flows: SessionRegistry<RoadmapFlow>,
    pub config: Config,
}
