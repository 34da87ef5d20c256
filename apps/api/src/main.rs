mod careers;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod progress;
mod quiz;
mod roadmap;
mod routes;
mod sessions;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::careers::suggester::AiCareerSuggester;
use crate::config::{Config, ProgressBackend};
use crate::db::{create_pool, PgGateway};
use crate::llm_client::structured::BalancedObjectParser;
use crate::llm_client::LlmClient;
use crate::progress::identity::FixedIdentity;
use crate::progress::local::LocalProgressRepository;
use crate::progress::merge::import_progress;
use crate::progress::repository::{PgProgressRepository, ProgressRepository};
use crate::progress::store::ProgressStore;
use crate::progress::streak::SystemClock;
use crate::roadmap::generator::AiRoadmapGenerator;
use crate::routes::build_router;
use crate::sessions::SessionRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roadmap API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let gateway = Arc::new(PgGateway::new(db.clone()));

    // Initialize LLM client
    let llm = Arc::new(
        LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout)
            .context("Failed to build LLM client")?,
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let parser = Arc::new(BalancedObjectParser);

    let progress_repo = build_progress_repository(&config, db).await?;
    let progress = ProgressStore::new(
        progress_repo,
        gateway.clone(),
        Arc::new(FixedIdentity::new(config.progress_user_id.clone())),
        Arc::new(SystemClock),
    );

    // Build app state
    let state = AppState {
        gateway,
        suggester: Arc::new(AiCareerSuggester::new(llm.clone(), parser.clone())),
        generator: Arc::new(AiRoadmapGenerator::new(llm, parser)),
        progress: Arc::new(progress),
        quizzes: SessionRegistry::new(config.session_ttl),
        flows: SessionRegistry::new(config.session_ttl),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the canonical progress backend and, if asked, folds the local file into postgres.
async fn build_progress_repository(
    config: &Config,
    db: sqlx::PgPool,
) -> Result<Arc<dyn ProgressRepository>> {
    let local = LocalProgressRepository::new(config.local_progress_path.clone());
    match config.progress_backend {
        ProgressBackend::Local => {
            info!("Progress stored locally at {}", local.path().display());
            Ok(Arc::new(local))
        }
        ProgressBackend::Postgres => {
            let pg = PgProgressRepository::new(db);
            if config.local_progress_import {
                import_progress(&local, &pg)
                    .await
                    .context("Failed to import local progress into PostgreSQL")?;
            }
            info!("Progress stored in PostgreSQL");
            Ok(Arc::new(pg))
        }
    }
}
