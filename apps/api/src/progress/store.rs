//! Progress Store: per-task completion, percentage and streak for stored roadmaps.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{PersistenceError, PersistenceGateway};
use crate::errors::AppError;
use crate::models::progress::{ProgressScope, ProgressSnapshot, Streak, TaskCategory, TaskKey};
use crate::models::roadmap::{RoadmapData, RoadmapRow};
use crate::progress::hub::{ProgressChange, ProgressEvent, ProgressHub, ProgressSubscription};
use crate::progress::identity::IdentityProvider;
use crate::progress::repository::ProgressRepository;
use crate::progress::streak::{advance_streak, Clock};

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("roadmap {0} not found")]
    UnknownRoadmap(Uuid),

    #[error("task {0} does not exist in this roadmap")]
    UnknownTask(TaskKey),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<ProgressError> for AppError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::UnknownRoadmap(_) => AppError::NotFound(err.to_string()),
            ProgressError::UnknownTask(_) => AppError::Validation(err.to_string()),
            ProgressError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

/// `round(100 × completed / total)`, 0 for an empty roadmap.
/// Only a fully completed roadmap reports 100.
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = ((completed as f64 * 100.0) / total as f64).round() as u8;
    if completed < total {
        rounded.min(99)
    } else {
        100
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressStatus {
    Begin,
    Started,
    Halfway,
    #[serde(rename = "Almost!")]
    Almost,
}

impl ProgressStatus {
    pub fn from_percentage(pct: u8) -> Self {
        match pct {
            0..=25 => ProgressStatus::Begin,
            26..=50 => ProgressStatus::Started,
            51..=75 => ProgressStatus::Halfway,
            _ => ProgressStatus::Almost,
        }
    }
}

fn motivational_message(pct: u8) -> &'static str {
    match pct {
        100 => "Congratulations! You've completed your roadmap!",
        76..=99 => "Almost there! Keep pushing!",
        51..=75 => "You're halfway through! Great progress!",
        26..=50 => "Great start! Keep the momentum going!",
        _ => "Your journey begins now! Take the first step today!",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub key: TaskKey,
    pub label: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthProgress {
    pub month: u32,
    pub title: String,
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
    pub skills: Vec<TaskView>,
    pub projects: Vec<TaskView>,
}

/// Dashboard payload for one roadmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub roadmap_id: Uuid,
    pub career: String,
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
    pub status: ProgressStatus,
    pub message: &'static str,
    pub streak: Streak,
    pub months: Vec<MonthProgress>,
}

impl ProgressView {
    pub fn build(
        roadmap_id: Uuid,
        career: &str,
        roadmap: &RoadmapData,
        snapshot: &ProgressSnapshot,
    ) -> Self {
        let months: Vec<MonthProgress> = roadmap
            .roadmap
            .iter()
            .enumerate()
            .map(|(month_index, month)| {
                let task = |category, task_index, label: &str| {
                    let key = TaskKey::new(month_index, category, task_index);
                    TaskView {
                        key,
                        label: label.to_string(),
                        completed: snapshot.is_completed(&key),
                    }
                };
                let skills: Vec<TaskView> = month
                    .skills
                    .iter()
                    .enumerate()
                    .map(|(i, s)| task(TaskCategory::Skill, i, s))
                    .collect();
                let projects: Vec<TaskView> = month
                    .projects
                    .iter()
                    .enumerate()
                    .map(|(i, p)| task(TaskCategory::Project, i, &p.name))
                    .collect();
                let total = skills.len() + projects.len();
                let completed = skills
                    .iter()
                    .chain(&projects)
                    .filter(|t| t.completed)
                    .count();
                MonthProgress {
                    month: month.month,
                    title: month.title.clone(),
                    completed,
                    total,
                    percentage: percentage(completed, total),
                    skills,
                    projects,
                }
            })
            .collect();

        let total = months.iter().map(|m| m.total).sum();
        let completed = months.iter().map(|m| m.completed).sum();
        let pct = percentage(completed, total);

        Self {
            roadmap_id,
            career: career.to_string(),
            completed,
            total,
            percentage: pct,
            status: ProgressStatus::from_percentage(pct),
            message: motivational_message(pct),
            streak: snapshot.streak,
            months,
        }
    }
}

fn task_exists(roadmap: &RoadmapData, key: &TaskKey) -> bool {
    roadmap.roadmap.get(key.month_index).is_some_and(|month| match key.category {
        TaskCategory::Skill => key.task_index < month.skills.len(),
        TaskCategory::Project => key.task_index < month.projects.len(),
    })
}

/// Flips one task and advances the streak.
pub fn apply_toggle(snapshot: &mut ProgressSnapshot, key: TaskKey, today: NaiveDate) {
    let completed = !snapshot.is_completed(&key);
    snapshot.tasks.insert(key, completed);
    snapshot.streak = advance_streak(snapshot.streak, today);
}

pub struct ProgressStore {
    repo: Arc<dyn ProgressRepository>,
    gateway: Arc<dyn PersistenceGateway>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    hub: ProgressHub,
    // Held across the write-through and publish so subscribers see writes in order.
    cache: Mutex<HashMap<ProgressScope, ProgressSnapshot>>,
}

impl ProgressStore {
    pub fn new(
        repo: Arc<dyn ProgressRepository>,
        gateway: Arc<dyn PersistenceGateway>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            gateway,
            identity,
            clock,
            hub: ProgressHub::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn scope(&self, roadmap_id: Uuid) -> ProgressScope {
        ProgressScope::new(self.identity.user_id(), roadmap_id)
    }

    async fn roadmap(&self, roadmap_id: Uuid) -> Result<RoadmapRow, ProgressError> {
        self.gateway
            .get_roadmap(roadmap_id)
            .await?
            .ok_or(ProgressError::UnknownRoadmap(roadmap_id))
    }

    async fn cached<'a>(
        &self,
        cache: &'a mut HashMap<ProgressScope, ProgressSnapshot>,
        scope: &ProgressScope,
    ) -> Result<&'a mut ProgressSnapshot, ProgressError> {
        if !cache.contains_key(scope) {
            let snapshot = self.repo.load(scope).await?;
            cache.insert(scope.clone(), snapshot);
        }
        Ok(cache.entry(scope.clone()).or_default())
    }

    async fn write_through(&self, scope: &ProgressScope, snapshot: &ProgressSnapshot) {
        if let Err(e) = self.repo.save(scope, snapshot).await {
            warn!("Failed to persist progress for roadmap {}: {e}", scope.roadmap_id);
        }
    }

    pub async fn view(&self, roadmap_id: Uuid) -> Result<ProgressView, ProgressError> {
        let row = self.roadmap(roadmap_id).await?;
        let scope = self.scope(roadmap_id);
        let mut cache = self.cache.lock().await;
        let snapshot = self.cached(&mut cache, &scope).await?;
        Ok(ProgressView::build(row.id, &row.career, &row.roadmap, snapshot))
    }

    pub async fn toggle(&self, roadmap_id: Uuid, key: TaskKey) -> Result<ProgressView, ProgressError> {
        let row = self.roadmap(roadmap_id).await?;
        if !task_exists(&row.roadmap, &key) {
            return Err(ProgressError::UnknownTask(key));
        }

        let scope = self.scope(roadmap_id);
        let mut cache = self.cache.lock().await;
        let snapshot = self.cached(&mut cache, &scope).await?;
        apply_toggle(snapshot, key, self.clock.today());

        let snapshot = snapshot.clone();
        self.write_through(&scope, &snapshot).await;
        let view = ProgressView::build(row.id, &row.career, &row.roadmap, &snapshot);
        self.hub.publish(ProgressEvent {
            scope,
            change: ProgressChange::Updated(view.clone()),
        });
        Ok(view)
    }

    /// Marks every task incomplete and clears the streak.
    pub async fn reset(&self, roadmap_id: Uuid) -> Result<ProgressView, ProgressError> {
        let row = self.roadmap(roadmap_id).await?;
        let scope = self.scope(roadmap_id);
        let mut cache = self.cache.lock().await;
        let snapshot = self.cached(&mut cache, &scope).await?;
        snapshot.tasks.values_mut().for_each(|done| *done = false);
        snapshot.streak = Streak::default();

        let snapshot = snapshot.clone();
        self.write_through(&scope, &snapshot).await;
        let view = ProgressView::build(row.id, &row.career, &row.roadmap, &snapshot);
        self.hub.publish(ProgressEvent {
            scope,
            change: ProgressChange::Updated(view.clone()),
        });
        info!("Reset progress for roadmap {roadmap_id}");
        Ok(view)
    }

    /// Deletes the roadmap document and every trace of its progress.
    pub async fn clear(&self, roadmap_id: Uuid) -> Result<(), ProgressError> {
        let scope = self.scope(roadmap_id);
        let mut cache = self.cache.lock().await;

        if !self.gateway.delete_roadmap(roadmap_id).await? {
            return Err(ProgressError::UnknownRoadmap(roadmap_id));
        }
        cache.remove(&scope);
        if let Err(e) = self.repo.delete(&scope).await {
            warn!("Failed to delete progress for roadmap {roadmap_id}: {e}");
        }
        self.hub.publish(ProgressEvent {
            scope,
            change: ProgressChange::Cleared { roadmap_id },
        });
        info!("Cleared roadmap {roadmap_id}");
        Ok(())
    }

    pub fn subscribe(&self, roadmap_id: Uuid) -> ProgressSubscription {
        self.hub.subscribe(self.scope(roadmap_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::identity::FixedIdentity;
    use crate::test_support::{
        roadmap_data, FixedClock, MemoryGateway, MemoryProgressRepository,
    };
    use crate::models::roadmap::Project;
    use proptest::prelude::*;

    struct Harness {
        store: ProgressStore,
        repo: Arc<MemoryProgressRepository>,
        gateway: Arc<MemoryGateway>,
        clock: Arc<FixedClock>,
        roadmap_id: Uuid,
    }

    async fn harness() -> Harness {
        let repo = Arc::new(MemoryProgressRepository::default());
        let gateway = Arc::new(MemoryGateway::default());
        let clock = Arc::new(FixedClock::new(day(19)));
        let roadmap_id = gateway.insert_roadmap("Frontend Developer", roadmap_data(6));
        let store = ProgressStore::new(
            repo.clone(),
            gateway.clone(),
            Arc::new(FixedIdentity::new("demoUser")),
            clock.clone(),
        );
        Harness {
            store,
            repo,
            gateway,
            clock,
            roadmap_id,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn skill(m: usize, t: usize) -> TaskKey {
        TaskKey::new(m, TaskCategory::Skill, t)
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(199, 200), 99);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ProgressStatus::from_percentage(25), ProgressStatus::Begin);
        assert_eq!(ProgressStatus::from_percentage(26), ProgressStatus::Started);
        assert_eq!(ProgressStatus::from_percentage(75), ProgressStatus::Halfway);
        assert_eq!(ProgressStatus::from_percentage(76), ProgressStatus::Almost);
        assert_eq!(
            serde_json::to_value(ProgressStatus::Almost).unwrap(),
            "Almost!"
        );
        assert!(motivational_message(100).starts_with("Congratulations"));
    }

    #[tokio::test]
    async fn test_fresh_roadmap_starts_at_zero() {
        let h = harness().await;
        let view = h.store.view(h.roadmap_id).await.unwrap();
        assert_eq!(view.percentage, 0);
        assert_eq!(view.status, ProgressStatus::Begin);
        assert_eq!(view.months.len(), 6);
        assert_eq!(view.total, roadmap_data(6).total_skills() + roadmap_data(6).total_projects());
        assert_eq!(view.streak, Streak::default());
    }

    #[tokio::test]
    async fn test_toggle_writes_through_and_starts_streak() {
        let h = harness().await;
        let view = h.store.toggle(h.roadmap_id, skill(0, 0)).await.unwrap();
        assert_eq!(view.completed, 1);
        assert!(view.months[0].skills[0].completed);
        assert_eq!(view.streak.count, 1);

        let stored = h
            .repo
            .load(&ProgressScope::new("demoUser", h.roadmap_id))
            .await
            .unwrap();
        assert!(stored.is_completed(&skill(0, 0)));
        assert_eq!(stored.streak.last_completed_date, Some(day(19)));
    }

    #[tokio::test]
    async fn test_streak_follows_calendar_days() {
        let h = harness().await;
        h.store.toggle(h.roadmap_id, skill(0, 0)).await.unwrap();
        let same_day = h.store.toggle(h.roadmap_id, skill(0, 1)).await.unwrap();
        assert_eq!(same_day.streak.count, 1);

        h.clock.set(day(20));
        let next_day = h.store.toggle(h.roadmap_id, skill(1, 0)).await.unwrap();
        assert_eq!(next_day.streak.count, 2);

        h.clock.set(day(25));
        let after_gap = h.store.toggle(h.roadmap_id, skill(1, 1)).await.unwrap();
        assert_eq!(after_gap.streak.count, 1);
    }

    #[tokio::test]
    async fn test_unknown_task_is_rejected() {
        let h = harness().await;
        let err = h
            .store
            .toggle(h.roadmap_id, skill(0, 99))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::UnknownTask(_)));
        let err = h.store.toggle(h.roadmap_id, skill(6, 0)).await.unwrap_err();
        assert!(matches!(err, ProgressError::UnknownTask(_)));
    }

    #[tokio::test]
    async fn test_unknown_roadmap_is_not_found() {
        let h = harness().await;
        let err = h.store.view(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            AppError::from(err),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_in_memory_state() {
        let h = harness().await;
        h.repo.fail_writes(true);
        let view = h.store.toggle(h.roadmap_id, skill(0, 0)).await.unwrap();
        assert_eq!(view.completed, 1);

        let again = h.store.view(h.roadmap_id).await.unwrap();
        assert_eq!(again.completed, 1);
    }

    #[tokio::test]
    async fn test_read_failure_propagates() {
        let h = harness().await;
        h.repo.fail_reads(true);
        let err = h.store.view(h.roadmap_id).await.unwrap_err();
        assert!(matches!(err, ProgressError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_progress_survives_a_new_store() {
        let h = harness().await;
        h.store.toggle(h.roadmap_id, skill(2, 0)).await.unwrap();

        let reopened = ProgressStore::new(
            h.repo.clone(),
            h.gateway.clone(),
            Arc::new(FixedIdentity::new("demoUser")),
            h.clock.clone(),
        );
        let view = reopened.view(h.roadmap_id).await.unwrap();
        assert!(view.months[2].skills[0].completed);
        assert_eq!(view.streak.count, 1);
    }

    #[tokio::test]
    async fn test_progress_is_scoped_per_user() {
        let h = harness().await;
        h.store.toggle(h.roadmap_id, skill(0, 0)).await.unwrap();

        let someone_else = ProgressStore::new(
            h.repo.clone(),
            h.gateway.clone(),
            Arc::new(FixedIdentity::new("otherUser")),
            h.clock.clone(),
        );
        assert_eq!(someone_else.view(h.roadmap_id).await.unwrap().completed, 0);
    }

    #[tokio::test]
    async fn test_reset_clears_tasks_and_streak() {
        let h = harness().await;
        h.store.toggle(h.roadmap_id, skill(0, 0)).await.unwrap();
        h.store.toggle(h.roadmap_id, skill(0, 1)).await.unwrap();

        let view = h.store.reset(h.roadmap_id).await.unwrap();
        assert_eq!(view.completed, 0);
        assert_eq!(view.percentage, 0);
        assert_eq!(view.streak, Streak::default());
    }

    #[tokio::test]
    async fn test_clear_removes_roadmap_and_progress() {
        let h = harness().await;
        h.store.toggle(h.roadmap_id, skill(0, 0)).await.unwrap();
        let mut sub = h.store.subscribe(h.roadmap_id);

        h.store.clear(h.roadmap_id).await.unwrap();

        assert!(h.gateway.roadmaps().is_empty());
        let stored = h
            .repo
            .load(&ProgressScope::new("demoUser", h.roadmap_id))
            .await
            .unwrap();
        assert_eq!(stored, ProgressSnapshot::default());
        assert!(matches!(
            sub.next().await,
            Some(ProgressChange::Cleared { .. })
        ));
        assert!(matches!(
            h.store.clear(h.roadmap_id).await,
            Err(ProgressError::UnknownRoadmap(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribers_see_updates_in_write_order() {
        let h = harness().await;
        let mut sub = h.store.subscribe(h.roadmap_id);

        h.store.toggle(h.roadmap_id, skill(0, 0)).await.unwrap();
        h.store.toggle(h.roadmap_id, skill(0, 1)).await.unwrap();

        for expected in [1, 2] {
            match sub.next().await {
                Some(ProgressChange::Updated(view)) => assert_eq!(view.completed, expected),
                other => panic!("unexpected change: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_completing_everything_reaches_one_hundred() {
        let h = harness().await;
        let data = roadmap_data(1);
        let id = h.gateway.insert_roadmap("Data Analyst", data.clone());
        let month = &data.roadmap[0];
        let mut last = None;
        for t in 0..month.skills.len() {
            last = Some(h.store.toggle(id, skill(0, t)).await.unwrap());
        }
        for t in 0..month.projects.len() {
            last = Some(
                h.store
                    .toggle(id, TaskKey::new(0, TaskCategory::Project, t))
                    .await
                    .unwrap(),
            );
        }
        let view = last.unwrap();
        assert_eq!(view.percentage, 100);
        assert_eq!(view.months[0].percentage, 100);
        assert!(view.message.starts_with("Congratulations"));
    }

    fn roadmap_with(shape: &[(usize, usize)]) -> RoadmapData {
        let mut data = roadmap_data(shape.len());
        for (month, (skills, projects)) in data.roadmap.iter_mut().zip(shape) {
            month.skills = (0..*skills).map(|i| format!("Skill {i}")).collect();
            month.projects = (0..*projects)
                .map(|i| Project {
                    name: format!("Project {i}"),
                    description: String::new(),
                })
                .collect();
        }
        data
    }

    fn all_keys(data: &RoadmapData) -> Vec<TaskKey> {
        data.roadmap
            .iter()
            .enumerate()
            .flat_map(|(m, month)| {
                (0..month.skills.len())
                    .map(move |t| TaskKey::new(m, TaskCategory::Skill, t))
                    .chain(
                        (0..month.projects.len())
                            .map(move |t| TaskKey::new(m, TaskCategory::Project, t)),
                    )
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_percentage_stays_in_range(total in 0usize..500, completed_seed in 0usize..500) {
            let completed = if total == 0 { 0 } else { completed_seed % (total + 1) };
            let pct = percentage(completed, total);
            prop_assert!(pct <= 100);
            if total == 0 {
                prop_assert_eq!(pct, 0);
            } else {
                prop_assert_eq!(pct == 100, completed == total);
            }
        }

        #[test]
        fn prop_double_toggle_restores_state(
            shape in prop::collection::vec((0usize..5, 0usize..3), 1..7),
            seed in any::<u64>(),
            pick in any::<prop::sample::Index>(),
        ) {
            let data = roadmap_with(&shape);
            let keys = all_keys(&data);
            prop_assume!(!keys.is_empty());

            let mut snapshot = ProgressSnapshot::default();
            for (i, key) in keys.iter().enumerate() {
                snapshot.tasks.insert(*key, (seed >> (i % 64)) & 1 == 1);
            }
            let id = Uuid::nil();
            let before = ProgressView::build(id, "Career", &data, &snapshot);

            let key = keys[pick.index(keys.len())];
            apply_toggle(&mut snapshot, key, day(19));
            apply_toggle(&mut snapshot, key, day(19));
            let after = ProgressView::build(id, "Career", &data, &snapshot);

            prop_assert_eq!(before.percentage, after.percentage);
            prop_assert_eq!(before.months, after.months);
        }
    }
}
