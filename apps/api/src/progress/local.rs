//! Device-local progress file.
//!
//! Layout mirrors the browser storage it replaces:
//!
//! ```json
//! {
//!   "roadmapProgress": { "demoUser:<roadmap-id>-0-skill-1": true },
//!   "streaks": { "demoUser:<roadmap-id>": { "count": 2, "last_completed_date": "2026-10-19" } }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::PersistenceError;
use crate::models::progress::{ProgressScope, ProgressSnapshot, Streak, TaskKey};
use crate::progress::repository::ProgressRepository;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalProgressFile {
    #[serde(default)]
    roadmap_progress: BTreeMap<String, bool>,
    #[serde(default)]
    streaks: BTreeMap<String, Streak>,
}

fn scope_key(scope: &ProgressScope) -> String {
    format!("{}:{}", scope.user_id, scope.roadmap_id)
}

/// Splits `user:uuid-m-category-t` into its scope and task.
fn parse_task_entry(entry: &str) -> Option<(ProgressScope, TaskKey)> {
    let (user_id, rest) = entry.rsplit_once(':')?;
    // A hyphenated uuid is always 36 characters.
    if rest.len() < 38 || !rest.is_char_boundary(36) {
        return None;
    }
    let (uuid, task) = rest.split_at(36);
    let roadmap_id = Uuid::parse_str(uuid).ok()?;
    let task = task.strip_prefix('-')?.parse::<TaskKey>().ok()?;
    Some((ProgressScope::new(user_id, roadmap_id), task))
}

fn parse_scope_entry(entry: &str) -> Option<ProgressScope> {
    let (user_id, uuid) = entry.rsplit_once(':')?;
    Some(ProgressScope::new(user_id, Uuid::parse_str(uuid).ok()?))
}

pub struct LocalProgressRepository {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl LocalProgressRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<LocalProgressFile, PersistenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(LocalProgressFile::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No local progress file at {}", self.path.display());
                Ok(LocalProgressFile::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, file: &LocalProgressFile) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(file)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn remove_scope(file: &mut LocalProgressFile, scope: &ProgressScope) {
        let prefix = format!("{}-", scope_key(scope));
        file.roadmap_progress.retain(|k, _| !k.starts_with(&prefix));
        file.streaks.remove(&scope_key(scope));
    }
}

#[async_trait]
impl ProgressRepository for LocalProgressRepository {
    async fn load(&self, scope: &ProgressScope) -> Result<ProgressSnapshot, PersistenceError> {
        let _guard = self.lock.lock().await;
        let file = self.read_file().await?;

        let mut snapshot = ProgressSnapshot::default();
        let prefix = format!("{}-", scope_key(scope));
        for (entry, completed) in file.roadmap_progress.range(prefix.clone()..) {
            if !entry.starts_with(&prefix) {
                break;
            }
            match parse_task_entry(entry) {
                Some((_, key)) => {
                    snapshot.tasks.insert(key, *completed);
                }
                None => warn!("Ignoring malformed progress entry '{entry}'"),
            }
        }
        if let Some(streak) = file.streaks.get(&scope_key(scope)) {
            snapshot.streak = *streak;
        }
        Ok(snapshot)
    }

    async fn save(
        &self,
        scope: &ProgressScope,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read_file().await?;

        Self::remove_scope(&mut file, scope);
        let base = scope_key(scope);
        for (key, completed) in &snapshot.tasks {
            file.roadmap_progress
                .insert(format!("{base}-{key}"), *completed);
        }
        file.streaks.insert(base, snapshot.streak);

        self.write_file(&file).await
    }

    async fn delete(&self, scope: &ProgressScope) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read_file().await?;
        Self::remove_scope(&mut file, scope);
        self.write_file(&file).await
    }

    async fn scopes(&self) -> Result<Vec<ProgressScope>, PersistenceError> {
        let _guard = self.lock.lock().await;
        let file = self.read_file().await?;

        let mut scopes: Vec<ProgressScope> = file
            .roadmap_progress
            .keys()
            .filter_map(|entry| parse_task_entry(entry).map(|(scope, _)| scope))
            .chain(file.streaks.keys().filter_map(|entry| parse_scope_entry(entry)))
            .collect();
        scopes.sort_by(|a, b| (&a.user_id, a.roadmap_id).cmp(&(&b.user_id, b.roadmap_id)));
        scopes.dedup();
        Ok(scopes)
    }
}
