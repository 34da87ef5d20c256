//! AI Suggestion Requester: turns an answer record into exactly three career suggestions.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::careers::prompts::{SUGGESTION_COUNT, SUGGESTION_MAX_TOKENS, SUGGESTION_PROMPT_TEMPLATE};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, RESPOND_ONLY_JSON};
use crate::llm_client::structured::{StructuredParseError, StructuredResponseParser};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::career::{CareerSuggestion, CareerSuggestions};
use crate::models::quiz::AnswerRecord;

/// Exactly the number of suggestions the careers step shows.
pub type CareerShortlist = [CareerSuggestion; SUGGESTION_COUNT];

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("generation service unreachable: {0}")]
    Network(#[from] LlmError),

    #[error("no structured payload in response: {0}")]
    MalformedResponse(#[from] StructuredParseError),

    #[error("payload does not match the career shape: {0}")]
    ShapeMismatch(String),
}

impl SuggestionError {
    pub fn code(&self) -> &'static str {
        match self {
            SuggestionError::Network(_) => "NETWORK_ERROR",
            SuggestionError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            SuggestionError::ShapeMismatch(_) => "SHAPE_MISMATCH",
        }
    }
}

#[async_trait]
pub trait CareerSuggester: Send + Sync {
    async fn suggest_careers(&self, answers: &AnswerRecord)
        -> Result<CareerShortlist, SuggestionError>;
}

pub struct AiCareerSuggester {
    llm: Arc<dyn TextGenerator>,
    parser: Arc<dyn StructuredResponseParser>,
}

impl AiCareerSuggester {
    pub fn new(llm: Arc<dyn TextGenerator>, parser: Arc<dyn StructuredResponseParser>) -> Self {
        Self { llm, parser }
    }
}

#[async_trait]
impl CareerSuggester for AiCareerSuggester {
    async fn suggest_careers(
        &self,
        answers: &AnswerRecord,
    ) -> Result<CareerShortlist, SuggestionError> {
        let prompt = build_suggestion_prompt(answers)?;
        let text = self
            .llm
            .generate(&prompt, JSON_ONLY_SYSTEM, SUGGESTION_MAX_TOKENS)
            .await?;

        let payload = self.parser.extract_object(&text)?;
        let suggestions: CareerSuggestions = serde_json::from_value(payload)
            .map_err(|e| SuggestionError::ShapeMismatch(e.to_string()))?;

        let shortlist = into_shortlist(suggestions.careers)?;
        info!(
            "Suggested careers: {}",
            shortlist
                .iter()
                .map(|c| c.title.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(shortlist)
    }
}

fn build_suggestion_prompt(answers: &AnswerRecord) -> Result<String, SuggestionError> {
    let answers_json = serde_json::to_string(answers)
        .map_err(|e| SuggestionError::ShapeMismatch(format!("unserializable answers: {e}")))?;
    Ok(SUGGESTION_PROMPT_TEMPLATE
        .replace("{respond_only_json}", RESPOND_ONLY_JSON)
        .replace("{answers_json}", &answers_json))
}

/// Fewer than three careers is an error; extras past the third are dropped.
fn into_shortlist(mut careers: Vec<CareerSuggestion>) -> Result<CareerShortlist, SuggestionError> {
    if careers.len() < SUGGESTION_COUNT {
        return Err(SuggestionError::ShapeMismatch(format!(
            "expected {SUGGESTION_COUNT} careers, got {}",
            careers.len()
        )));
    }
    if careers.len() > SUGGESTION_COUNT {
        warn!(
            "Model returned {} careers, keeping the first {SUGGESTION_COUNT}",
            careers.len()
        );
        careers.truncate(SUGGESTION_COUNT);
    }
    if let Some(blank) = careers.iter().position(|c| c.title.trim().is_empty()) {
        return Err(SuggestionError::ShapeMismatch(format!(
            "career {} has an empty title",
            blank + 1
        )));
    }
    careers
        .try_into()
        .map_err(|_| SuggestionError::ShapeMismatch("career count changed".to_string()))
}
