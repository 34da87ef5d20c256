//! Quiz Flow Controller: walks the question bank and submits the finished answer set.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{PersistenceError, PersistenceGateway};
use crate::errors::AppError;
use crate::models::quiz::AnswerRecord;
use crate::quiz::question_bank::Question;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("'{option}' is not an option for question {question_id}")]
    UnknownOption { question_id: u32, option: String },

    #[error("quiz has already been submitted")]
    AlreadySubmitted,

    #[error("question bank is empty")]
    EmptyBank,

    #[error("failed to save quiz answers: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::UnknownOption { .. } => AppError::Validation(err.to_string()),
            QuizError::AlreadySubmitted => AppError::InvalidTransition(err.to_string()),
            QuizError::EmptyBank => AppError::Internal(anyhow::anyhow!(err)),
            QuizError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

/// The immutable payload handed to the roadmap flow once the quiz is saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSubmission {
    pub submission_id: Uuid,
    pub answers: AnswerRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Advanced { question_index: usize },
    Submitted(QuizSubmission),
}

pub struct QuizSession {
    id: Uuid,
    bank: &'static [Question],
    current: usize,
    answers: AnswerRecord,
    submission: Option<QuizSubmission>,
    advance_delay: Duration,
}

impl QuizSession {
    pub fn new(bank: &'static [Question], advance_delay: Duration) -> Result<Self, QuizError> {
        if bank.is_empty() {
            return Err(QuizError::EmptyBank);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            bank,
            current: 0,
            answers: AnswerRecord::new(),
            submission: None,
            advance_delay,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.bank.len()
    }

    pub fn current_question(&self) -> &'static Question {
        &self.bank[self.current]
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn submission(&self) -> Option<&QuizSubmission> {
        self.submission.as_ref()
    }

    /// `(index + 1) / total`, as a whole percentage.
    pub fn progress_percent(&self) -> u32 {
        (((self.current + 1) as f64 / self.total() as f64) * 100.0).round() as u32
    }

    pub fn questions_left(&self) -> usize {
        self.total() - self.current - 1
    }

    /// Records `option` for the current question and advances after the display delay.
    ///
    /// Answering the last question persists the full answer record. If that write fails
    /// the session stays on the last question with every answer intact.
    pub async fn answer(
        &mut self,
        option: &str,
        gateway: &dyn PersistenceGateway,
    ) -> Result<AnswerOutcome, QuizError> {
        if self.submission.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }

        let question = self.current_question();
        if !question.has_option(option) {
            return Err(QuizError::UnknownOption {
                question_id: question.id,
                option: option.to_string(),
            });
        }
        self.answers.record(question.id, question.prompt, option);

        if self.current + 1 < self.total() {
            tokio::time::sleep(self.advance_delay).await;
            self.current += 1;
            return Ok(AnswerOutcome::Advanced {
                question_index: self.current,
            });
        }

        self.submit(gateway).await
    }

    async fn submit(&mut self, gateway: &dyn PersistenceGateway) -> Result<AnswerOutcome, QuizError> {
        debug_assert_eq!(self.answers.len(), self.total());

        let submission_id = match gateway.save_quiz_submission(&self.answers).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Quiz session {} failed to save answers: {e}", self.id);
                return Err(QuizError::Persistence(e));
            }
        };

        info!(
            "Quiz session {} submitted as {submission_id} with {} answers",
            self.id,
            self.answers.len()
        );

        let submission = QuizSubmission {
            submission_id,
            answers: self.answers.clone(),
        };
        self.submission = Some(submission.clone());
        Ok(AnswerOutcome::Submitted(submission))
    }

    /// Moves to the previous question. Returns `false` (and does nothing) on the first
    /// question or after submission.
    pub fn back(&mut self) -> bool {
        if self.current == 0 || self.submission.is_some() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn view(&self) -> QuizView {
        QuizView {
            session_id: self.id,
            status: if self.submission.is_some() {
                QuizStatus::Submitted
            } else {
                QuizStatus::InProgress
            },
            question_index: self.current,
            total_questions: self.total(),
            progress_percent: self.progress_percent(),
            questions_left: self.questions_left(),
            question: self.submission.is_none().then(|| *self.current_question()),
            can_go_back: self.current > 0 && self.submission.is_none(),
            answered: self.answers.len(),
            submission: self.submission.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    InProgress,
    Submitted,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub session_id: Uuid,
    pub status: QuizStatus,
    pub question_index: usize,
    pub total_questions: usize,
    pub progress_percent: u32,
    pub questions_left: usize,
    pub question: Option<Question>,
    pub can_go_back: bool,
    pub answered: usize,
    pub submission: Option<QuizSubmission>,
}
