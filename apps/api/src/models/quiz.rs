use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One answered question, carrying the question text alongside the chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    pub answer: String,
}

/// Quiz answers keyed by question id.
///
/// Serializes as `{"1": {"question": ..., "answer": ...}, ...}`, the same document
/// shape that is stored and embedded in the suggestion prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerRecord(BTreeMap<u32, AnsweredQuestion>);

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the answer for `question_id`, replacing an earlier answer to the same question.
    pub fn record(&mut self, question_id: u32, question: &str, answer: &str) {
        self.0.insert(
            question_id,
            AnsweredQuestion {
                question: question.to_string(),
                answer: answer.to_string(),
            },
        );
    }

    pub fn get(&self, question_id: u32) -> Option<&AnsweredQuestion> {
        self.0.get(&question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn question_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }
}
