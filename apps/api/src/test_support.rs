//! In-memory doubles and fixtures shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::{PersistenceError, PersistenceGateway};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::progress::{ProgressScope, ProgressSnapshot};
use crate::models::quiz::AnswerRecord;
use crate::models::roadmap::{Month, NewRoadmap, Project, Resource, RoadmapData, RoadmapRow};
use crate::progress::repository::ProgressRepository;
use crate::progress::streak::Clock;

fn injected_failure(what: &str) -> PersistenceError {
    PersistenceError::Io(std::io::Error::other(format!("injected {what} failure")))
}

/// Replays canned generation results in order and records every prompt.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new(responses: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _system: &str, _max_tokens: u32) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::EmptyContent))
    }
}

#[derive(Default)]
struct GatewayState {
    quiz_submissions: Vec<AnswerRecord>,
    roadmaps: Vec<RoadmapRow>,
}

/// Document store double. Roadmaps are listed newest first.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<GatewayState>,
    fail_writes: AtomicBool,
}

impl MemoryGateway {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn quiz_submissions(&self) -> Vec<AnswerRecord> {
        self.state.lock().unwrap().quiz_submissions.clone()
    }

    pub fn roadmaps(&self) -> Vec<RoadmapRow> {
        self.state.lock().unwrap().roadmaps.clone()
    }

    pub fn insert_roadmap(&self, career: &str, roadmap: RoadmapData) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().roadmaps.push(RoadmapRow {
            id,
            quiz_id: None,
            career: career.to_string(),
            current_skills: String::new(),
            current_year: "First Year".to_string(),
            roadmap: Json(roadmap),
            created_at: Utc::now(),
        });
        id
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save_quiz_submission(&self, answers: &AnswerRecord) -> Result<Uuid, PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_failure("quiz write"));
        }
        self.state
            .lock()
            .unwrap()
            .quiz_submissions
            .push(answers.clone());
        Ok(Uuid::new_v4())
    }

    async fn save_roadmap(&self, roadmap: &NewRoadmap) -> Result<Uuid, PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_failure("roadmap write"));
        }
        let id = Uuid::new_v4();
        self.state.lock().unwrap().roadmaps.push(RoadmapRow {
            id,
            quiz_id: roadmap.quiz_id,
            career: roadmap.career.clone(),
            current_skills: roadmap.current_skills.clone(),
            current_year: roadmap.current_year.label().to_string(),
            roadmap: Json(roadmap.roadmap.clone()),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_roadmaps(&self) -> Result<Vec<RoadmapRow>, PersistenceError> {
        let mut rows = self.roadmaps();
        rows.reverse();
        Ok(rows)
    }

    async fn get_roadmap(&self, id: Uuid) -> Result<Option<RoadmapRow>, PersistenceError> {
        Ok(self.roadmaps().into_iter().find(|r| r.id == id))
    }

    async fn delete_roadmap(&self, id: Uuid) -> Result<bool, PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_failure("roadmap delete"));
        }
        let mut state = self.state.lock().unwrap();
        let before = state.roadmaps.len();
        state.roadmaps.retain(|r| r.id != id);
        Ok(state.roadmaps.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryProgressRepository {
    records: Mutex<HashMap<ProgressScope, ProgressSnapshot>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryProgressRepository {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProgressRepository for MemoryProgressRepository {
    async fn load(&self, scope: &ProgressScope) -> Result<ProgressSnapshot, PersistenceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected_failure("progress read"));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(scope)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(
        &self,
        scope: &ProgressScope,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_failure("progress write"));
        }
        self.records
            .lock()
            .unwrap()
            .insert(scope.clone(), snapshot.clone());
        Ok(())
    }

    async fn delete(&self, scope: &ProgressScope) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_failure("progress delete"));
        }
        self.records.lock().unwrap().remove(scope);
        Ok(())
    }

    async fn scopes(&self) -> Result<Vec<ProgressScope>, PersistenceError> {
        Ok(self.records.lock().unwrap().keys().cloned().collect())
    }
}

pub struct FixedClock(Mutex<NaiveDate>);

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self(Mutex::new(today))
    }

    pub fn set(&self, today: NaiveDate) {
        *self.0.lock().unwrap() = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

/// `{"careers": [...]}` with titles `Career 1..=n`.
pub fn careers_json(n: usize) -> String {
    let careers: Vec<_> = (1..=n)
        .map(|i| {
            json!({
                "title": format!("Career {i}"),
                "description": format!("What career {i} does day to day."),
                "skills": ["Git", "SQL", "Communication"],
                "match": "Fits your interest in building things.",
                "salary": "$60,000 - $100,000",
                "demand": "High"
            })
        })
        .collect();
    json!({ "careers": careers }).to_string()
}

/// Months `1..=n`, each with three skills and two projects.
pub fn roadmap_data(n: usize) -> RoadmapData {
    RoadmapData {
        roadmap: (1..=n as u32)
            .map(|i| Month {
                month: i,
                title: format!("Month {i} title"),
                focus: format!("Focus for month {i}"),
                skills: (1..=3).map(|s| format!("Skill {i}.{s}")).collect(),
                resources: vec![Resource {
                    name: format!("Course {i}"),
                    resource_type: "Course".to_string(),
                    link: "https://example.com".to_string(),
                }],
                projects: (1..=2)
                    .map(|p| Project {
                        name: format!("Project {i}.{p}"),
                        description: "Build it and ship it.".to_string(),
                    })
                    .collect(),
                weekly_hours: "8-10 hours".to_string(),
            })
            .collect(),
        total_estimate: format!("{n} months"),
        next_steps: "Apply for internships".to_string(),
    }
}

pub fn roadmap_json(n: usize) -> String {
    serde_json::to_string(&roadmap_data(n)).unwrap()
}

pub fn sample_answers() -> AnswerRecord {
    let mut answers = AnswerRecord::new();
    answers.record(1, "What interests you most in tech?", "Building apps and websites");
    answers.record(2, "What's your ideal work style?", "Collaborative team projects");
    answers.record(3, "Technical or Creative?", "Very technical - love logic and systems");
    answers
}
