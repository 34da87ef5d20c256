//! Roadmap Flow Controller.
//!
//! ```text
//! (answers) ──suggest ok──▶ careers ──select──▶ input ──generate──▶ generating ──ok──▶ roadmap
//!     │                        ▲                 │  ▲                    │
//!     └─suggest err─▶ quiz     └──────back───────┘  └────────err─────────┘
//! ```
//!
//! A flow only exists once suggestions arrived, so `careers` always holds exactly the
//! shortlist of the request that created it. The `roadmap` step owns a parsed
//! `RoadmapData`, never an optional one.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::careers::suggester::{CareerShortlist, CareerSuggester, SuggestionError};
use crate::db::PersistenceGateway;
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::career::CareerSuggestion;
use crate::models::quiz::AnswerRecord;
use crate::models::roadmap::{AcademicYear, NewRoadmap, RoadmapData};
use crate::roadmap::generator::{RoadmapError, RoadmapGenerator, RoadmapRequest};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("cannot {action} while in the {step} step")]
    InvalidTransition {
        action: &'static str,
        step: &'static str,
    },

    #[error("career index {0} is out of range")]
    CareerIndex(usize),

    #[error(transparent)]
    Roadmap(#[from] RoadmapError),
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::InvalidTransition { .. } => AppError::InvalidTransition(err.to_string()),
            FlowError::CareerIndex(_) => AppError::Validation(err.to_string()),
            FlowError::Roadmap(e) => AppError::Roadmap(e),
        }
    }
}

/// The personalization inputs carried from `input` through `generating` and back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Background {
    pub current_skills: String,
    pub current_year: AcademicYear,
}

#[derive(Debug, Clone, PartialEq)]
enum FlowStep {
    Careers,
    Input {
        selected: usize,
        background: Background,
        last_error: Option<String>,
    },
    Generating {
        selected: usize,
        background: Background,
    },
    Roadmap {
        selected: usize,
        background: Background,
        roadmap: RoadmapData,
        roadmap_id: Option<Uuid>,
    },
}

impl FlowStep {
    fn name(&self) -> &'static str {
        match self {
            FlowStep::Careers => "careers",
            FlowStep::Input { .. } => "input",
            FlowStep::Generating { .. } => "generating",
            FlowStep::Roadmap { .. } => "roadmap",
        }
    }
}

pub struct RoadmapFlow {
    id: Uuid,
    quiz_id: Option<Uuid>,
    careers: CareerShortlist,
    step: FlowStep,
}

impl RoadmapFlow {
    /// Requests suggestions for `answers`. On failure no flow exists and the caller
    /// must send the user back to the quiz.
    pub async fn start(
        quiz_id: Option<Uuid>,
        answers: &AnswerRecord,
        suggester: &dyn CareerSuggester,
        timeout: Duration,
    ) -> Result<Self, SuggestionError> {
        let careers = tokio::time::timeout(timeout, suggester.suggest_careers(answers))
            .await
            .map_err(|_| SuggestionError::Network(LlmError::Timeout(timeout)))??;

        let flow = Self {
            id: Uuid::new_v4(),
            quiz_id,
            careers,
            step: FlowStep::Careers,
        };
        info!("Roadmap flow {} started with {} careers", flow.id, flow.careers.len());
        Ok(flow)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step_name(&self) -> &'static str {
        self.step.name()
    }

    pub fn careers(&self) -> &CareerShortlist {
        &self.careers
    }

    pub fn roadmap(&self) -> Option<&RoadmapData> {
        match &self.step {
            FlowStep::Roadmap { roadmap, .. } => Some(roadmap),
            _ => None,
        }
    }

    /// `careers → input`.
    pub fn select_career(&mut self, index: usize) -> Result<&CareerSuggestion, FlowError> {
        if !matches!(self.step, FlowStep::Careers) {
            return Err(self.invalid("select a career"));
        }
        if index >= self.careers.len() {
            return Err(FlowError::CareerIndex(index));
        }
        self.step = FlowStep::Input {
            selected: index,
            background: Background::default(),
            last_error: None,
        };
        Ok(&self.careers[index])
    }

    /// `input → careers`, keeping the same shortlist.
    pub fn back_to_careers(&mut self) -> Result<(), FlowError> {
        if !matches!(self.step, FlowStep::Input { .. }) {
            return Err(self.invalid("go back to careers"));
        }
        self.step = FlowStep::Careers;
        Ok(())
    }

    /// `input → generating → roadmap`, or back to `input` with the background kept.
    ///
    /// Saving the finished roadmap is best effort: a failed write is logged and the
    /// user still gets the roadmap, just without a dashboard id.
    pub async fn generate(
        &mut self,
        background: Background,
        generator: &dyn RoadmapGenerator,
        gateway: &dyn PersistenceGateway,
        timeout: Duration,
    ) -> Result<&RoadmapData, FlowError> {
        let selected = match self.step {
            FlowStep::Input { selected, .. } => selected,
            _ => return Err(self.invalid("generate a roadmap")),
        };
        self.step = FlowStep::Generating {
            selected,
            background: background.clone(),
        };

        let career = &self.careers[selected];
        let request = RoadmapRequest {
            career_title: career.title.clone(),
            current_skills: background.current_skills.clone(),
            current_year: background.current_year,
        };

        let result = tokio::time::timeout(timeout, generator.generate_roadmap(&request))
            .await
            .unwrap_or_else(|_| Err(RoadmapError::Network(LlmError::Timeout(timeout))));

        let roadmap = match result {
            Ok(roadmap) => roadmap,
            Err(e) => {
                warn!("Roadmap flow {} generation failed: {e}", self.id);
                self.step = FlowStep::Input {
                    selected,
                    background,
                    last_error: Some(e.to_string()),
                };
                return Err(FlowError::Roadmap(e));
            }
        };

        let record = NewRoadmap {
            quiz_id: self.quiz_id,
            career: request.career_title,
            current_skills: request.current_skills,
            current_year: request.current_year,
            roadmap: roadmap.clone(),
        };
        let roadmap_id = match gateway.save_roadmap(&record).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Roadmap flow {} could not save roadmap: {e}", self.id);
                None
            }
        };

        self.step = FlowStep::Roadmap {
            selected,
            background,
            roadmap,
            roadmap_id,
        };
        match &self.step {
            FlowStep::Roadmap { roadmap, .. } => Ok(roadmap),
            _ => unreachable!("step was just set to roadmap"),
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            step: self.step.name(),
        }
    }

    pub fn view(&self) -> FlowView {
        let flow_id = self.id;
        match &self.step {
            FlowStep::Careers => FlowView::Careers {
                flow_id,
                careers: self.careers.to_vec(),
            },
            FlowStep::Input {
                selected,
                background,
                last_error,
            } => FlowView::Input {
                flow_id,
                career: self.careers[*selected].clone(),
                current_skills: background.current_skills.clone(),
                current_year: background.current_year,
                academic_years: AcademicYear::ALL.to_vec(),
                last_error: last_error.clone(),
            },
            FlowStep::Generating { selected, .. } => FlowView::Generating {
                flow_id,
                career: Some(self.careers[*selected].clone()),
            },
            FlowStep::Roadmap {
                selected,
                roadmap,
                roadmap_id,
                ..
            } => FlowView::Roadmap {
                flow_id,
                career: self.careers[*selected].clone(),
                roadmap: roadmap.clone(),
                roadmap_id: *roadmap_id,
                dashboard: roadmap_id.map(|id| format!("/api/v1/roadmaps/{id}/progress")),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum FlowView {
    Careers {
        flow_id: Uuid,
        careers: Vec<CareerSuggestion>,
    },
    Input {
        flow_id: Uuid,
        career: CareerSuggestion,
        current_skills: String,
        current_year: AcademicYear,
        academic_years: Vec<AcademicYear>,
        last_error: Option<String>,
    },
    /// `career` is `None` when the flow is busy and could not be inspected.
    Generating {
        flow_id: Uuid,
        career: Option<CareerSuggestion>,
    },
    Roadmap {
        flow_id: Uuid,
        career: CareerSuggestion,
        roadmap: RoadmapData,
        roadmap_id: Option<Uuid>,
        dashboard: Option<String>,
    },
}
