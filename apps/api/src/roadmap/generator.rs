//! AI Roadmap Requester: selected career + background in, parsed six-month roadmap out.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, RESPOND_ONLY_JSON};
use crate::llm_client::structured::{StructuredParseError, StructuredResponseParser};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::roadmap::{AcademicYear, RoadmapData};
use crate::roadmap::prompts::{
    BEGINNER_SKILLS, ROADMAP_MAX_TOKENS, ROADMAP_MONTHS, ROADMAP_PROMPT_TEMPLATE,
};

#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("generation service unreachable: {0}")]
    Network(#[from] LlmError),

    #[error("no structured payload in response: {0}")]
    MalformedResponse(#[from] StructuredParseError),

    #[error("payload does not match the roadmap shape: {0}")]
    ShapeMismatch(String),
}

impl RoadmapError {
    pub fn code(&self) -> &'static str {
        match self {
            RoadmapError::Network(_) => "NETWORK_ERROR",
            RoadmapError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            RoadmapError::ShapeMismatch(_) => "SHAPE_MISMATCH",
        }
    }
}

/// What the personalization step collects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapRequest {
    pub career_title: String,
    #[serde(default)]
    pub current_skills: String,
    #[serde(default)]
    pub current_year: AcademicYear,
}

#[async_trait]
pub trait RoadmapGenerator: Send + Sync {
    async fn generate_roadmap(&self, request: &RoadmapRequest)
        -> Result<RoadmapData, RoadmapError>;
}

pub struct AiRoadmapGenerator {
    llm: Arc<dyn TextGenerator>,
    parser: Arc<dyn StructuredResponseParser>,
}

impl AiRoadmapGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>, parser: Arc<dyn StructuredResponseParser>) -> Self {
        Self { llm, parser }
    }
}

#[async_trait]
impl RoadmapGenerator for AiRoadmapGenerator {
    async fn generate_roadmap(
        &self,
        request: &RoadmapRequest,
    ) -> Result<RoadmapData, RoadmapError> {
        let prompt = build_roadmap_prompt(request);
        let text = self
            .llm
            .generate(&prompt, JSON_ONLY_SYSTEM, ROADMAP_MAX_TOKENS)
            .await?;

        let payload = self.parser.extract_object(&text)?;
        let data: RoadmapData = serde_json::from_value(payload)
            .map_err(|e| RoadmapError::ShapeMismatch(e.to_string()))?;
        let data = normalize(data)?;

        info!(
            "Generated {}-month roadmap for '{}'",
            data.roadmap.len(),
            request.career_title
        );
        Ok(data)
    }
}

pub fn build_roadmap_prompt(request: &RoadmapRequest) -> String {
    let skills = match request.current_skills.trim() {
        "" => BEGINNER_SKILLS,
        s => s,
    };
    ROADMAP_PROMPT_TEMPLATE
        .replace("{respond_only_json}", RESPOND_ONLY_JSON)
        .replace("{career_title}", &request.career_title)
        .replace("{current_skills}", skills)
        .replace("{current_year}", request.current_year.label())
}

/// Rejects an empty plan and numbers months the model left unnumbered.
/// Month order is kept exactly as returned.
fn normalize(mut data: RoadmapData) -> Result<RoadmapData, RoadmapError> {
    if data.roadmap.is_empty() {
        return Err(RoadmapError::ShapeMismatch(
            "roadmap contains no months".to_string(),
        ));
    }
    if data.roadmap.len() != ROADMAP_MONTHS {
        warn!(
            "Roadmap has {} months instead of {ROADMAP_MONTHS}",
            data.roadmap.len()
        );
    }
    for (position, month) in data.roadmap.iter_mut().enumerate() {
        if month.month == 0 {
            month.month = position as u32 + 1;
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::structured::BalancedObjectParser;
    use crate::test_support::{roadmap_json, ScriptedGenerator};

    fn generator(llm: Arc<ScriptedGenerator>) -> AiRoadmapGenerator {
        AiRoadmapGenerator::new(llm, Arc::new(BalancedObjectParser))
    }

    fn request(skills: &str) -> RoadmapRequest {
        RoadmapRequest {
            career_title: "Frontend Developer".to_string(),
            current_skills: skills.to_string(),
            current_year: AcademicYear::SecondYear,
        }
    }

    #[test]
    fn test_prompt_is_parameterized() {
        let prompt = build_roadmap_prompt(&request("HTML, CSS"));
        assert!(prompt.contains("a Second Year student wanting to become a Frontend Developer"));
        assert!(prompt.contains("Current skills: HTML, CSS"));
        assert!(prompt.contains("Respond ONLY with valid JSON:"));
        assert!(!prompt.contains("{career_title}"));
    }

    #[test]
    fn test_blank_skills_become_beginner() {
        let prompt = build_roadmap_prompt(&request("   "));
        assert!(prompt.contains("Current skills: Complete beginner"));
    }

    #[tokio::test]
    async fn test_six_months_parsed_in_order() {
        let llm = Arc::new(ScriptedGenerator::new([Ok(roadmap_json(6))]));
        let data = generator(llm).generate_roadmap(&request("")).await.unwrap();
        assert_eq!(data.roadmap.len(), 6);
        let months: Vec<u32> = data.roadmap.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(data.roadmap[3].title, "Month 4 title");
    }

    #[tokio::test]
    async fn test_prose_around_roadmap_is_tolerated() {
        let text = format!("Here is your plan!\n```json\n{}\n```\nEnjoy.", roadmap_json(6));
        let llm = Arc::new(ScriptedGenerator::new([Ok(text)]));
        let data = generator(llm).generate_roadmap(&request("")).await.unwrap();
        assert_eq!(data.next_steps, "Apply for internships");
    }

    #[tokio::test]
    async fn test_short_roadmap_is_accepted() {
        let llm = Arc::new(ScriptedGenerator::new([Ok(roadmap_json(4))]));
        let data = generator(llm).generate_roadmap(&request("")).await.unwrap();
        assert_eq!(data.roadmap.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_month_list_is_shape_mismatch() {
        let llm = Arc::new(ScriptedGenerator::new([Ok(
            r#"{"roadmap": [], "totalEstimate": "0", "nextSteps": ""}"#.to_string(),
        )]));
        let err = generator(llm).generate_roadmap(&request("")).await.unwrap_err();
        assert_eq!(err.code(), "SHAPE_MISMATCH");
    }

    #[tokio::test]
    async fn test_missing_month_numbers_are_filled_by_position() {
        let llm = Arc::new(ScriptedGenerator::new([Ok(r#"{
            "roadmap": [{"title": "Start"}, {"month": 7, "title": "Odd"}, {"title": "End"}]
        }"#
        .to_string())]));
        let data = generator(llm).generate_roadmap(&request("")).await.unwrap();
        let months: Vec<u32> = data.roadmap.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![1, 7, 3]);
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let llm = Arc::new(ScriptedGenerator::new([Ok("Sorry, try later".to_string())]));
        let err = generator(llm).generate_roadmap(&request("")).await.unwrap_err();
        assert!(matches!(
            err,
            RoadmapError::MalformedResponse(StructuredParseError::NoObject)
        ));
    }
}
