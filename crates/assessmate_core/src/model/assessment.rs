//! Assessment, question and peer-response records.
//!
//! # Responsibility
//! - Define the assessment lifecycle fields and Likert questions.
//! - Define peer responses and their write-time validation.
//!
//! # Invariants
//! - `due_at` is never earlier than `publish_at`.
//! - A response never rates its own author.
//! - Every answer score is at least 1.

use super::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle state of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    /// Visible to the teacher only.
    Draft,
    /// Open to students between `publish_at` and `due_at`.
    Published,
}

impl AssessmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

/// Question kind. Only fixed-scale ratings exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Likert,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Likert => "likert",
        }
    }
}

/// Peer-review assessment attached to a course (`assessments` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: RecordId,
    pub course_id: RecordId,
    pub title: String,
    pub status: AssessmentStatus,
    /// Unix epoch milliseconds.
    pub publish_at: i64,
    /// Unix epoch milliseconds. Must be >= `publish_at`.
    pub due_at: i64,
    pub results_released: bool,
}

impl Assessment {
    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.due_at < self.publish_at {
            return Err(ModelValidationError::DueBeforePublish {
                publish_at: self.publish_at,
                due_at: self.due_at,
            });
        }
        Ok(())
    }
}

/// One prompt of an assessment (`assessment_questions` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: RecordId,
    pub assessment_id: RecordId,
    pub question_type: QuestionType,
    pub content: String,
    /// Zero-based display order inside the assessment.
    pub position: u32,
}

/// One rater's scores for one teammate (`assessment_responses` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: RecordId,
    pub assessment_id: RecordId,
    pub rater_id: RecordId,
    pub ratee_id: RecordId,
    /// Question id to score.
    pub answers: BTreeMap<RecordId, u8>,
    pub submitted: bool,
}

impl Response {
    /// Checks write-time invariants: no self-evaluation and every score in
    /// `1..=max_score`.
    pub fn validate(&self, max_score: u8) -> Result<(), ModelValidationError> {
        if self.rater_id == self.ratee_id {
            return Err(ModelValidationError::SelfEvaluation(self.rater_id));
        }
        if let Some((question_id, score)) = self
            .answers
            .iter()
            .find(|(_, score)| !(1..=max_score).contains(*score))
        {
            return Err(ModelValidationError::ScoreOutOfRange {
                question_id: *question_id,
                score: *score,
                max_score,
            });
        }
        Ok(())
    }
}

/// Write-time validation failure for assessment records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    DueBeforePublish { publish_at: i64, due_at: i64 },
    SelfEvaluation(RecordId),
    ScoreOutOfRange {
        question_id: RecordId,
        score: u8,
        max_score: u8,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DueBeforePublish { publish_at, due_at } => write!(
                f,
                "assessment due_at {due_at} is earlier than publish_at {publish_at}"
            ),
            Self::SelfEvaluation(user_id) => {
                write!(f, "response rates its own author: {user_id}")
            }
            Self::ScoreOutOfRange {
                question_id,
                score,
                max_score,
            } => write!(
                f,
                "score {score} for question {question_id} is outside 1..={max_score}"
            ),
        }
    }
}

impl Error for ModelValidationError {}
