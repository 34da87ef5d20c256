use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which backend holds the canonical copy of task progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBackend {
    Postgres,
    Local,
}

impl FromStr for ProgressBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(ProgressBackend::Postgres),
            "local" | "file" => Ok(ProgressBackend::Local),
            other => bail!("PROGRESS_BACKEND must be 'postgres' or 'local', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound for a single generation request, including retries.
    pub llm_timeout: Duration,
    /// Pause between answering a question and showing the next one.
    pub quiz_advance_delay: Duration,
    /// How long an untouched quiz session or roadmap flow is kept in memory.
    pub session_ttl: Duration,
    pub progress_backend: ProgressBackend,
    pub local_progress_path: PathBuf,
    /// Merge the local progress file into postgres at startup.
    pub local_progress_import: bool,
    pub progress_user_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_timeout: Duration::from_secs(
                parse_env("LLM_TIMEOUT_SECS", 90u64)
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            quiz_advance_delay: Duration::from_millis(
                parse_env("QUIZ_ADVANCE_DELAY_MS", 300u64)
                    .context("QUIZ_ADVANCE_DELAY_MS must be a whole number of milliseconds")?,
            ),
            session_ttl: Duration::from_secs(
                parse_env("SESSION_TTL_SECS", 3600u64)
                    .context("SESSION_TTL_SECS must be a whole number of seconds")?,
            ),
            progress_backend: parse_env("PROGRESS_BACKEND", ProgressBackend::Postgres)?,
            local_progress_path: std::env::var("LOCAL_PROGRESS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("roadmap_progress.json")),
            local_progress_import: parse_env("LOCAL_PROGRESS_IMPORT", false)
                .context("LOCAL_PROGRESS_IMPORT must be true or false")?,
            progress_user_id: std::env::var("PROGRESS_USER_ID")
                .unwrap_or_else(|_| "demoUser".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value '{raw}' for {key}: {e}")),
        Err(_) => Ok(default),
    }
}
