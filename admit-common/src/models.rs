//! Domain records persisted by the trainer
//!
//! Row types serialize with snake_case keys, matching the column names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A person working through the training content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trainee {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
}

/// Section completion status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ProgressStatus::NotStarted),
            "in_progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            other => Err(Error::InvalidInput(format!("Unknown status: {}", other))),
        }
    }
}

/// One row per (trainee, section) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub id: String,
    pub trainee_id: String,
    pub section_id: String,
    pub status: ProgressStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Kind of exercise a response answers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    MultipleChoice,
    ShortAnswer,
    Voice,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::MultipleChoice => "multiple_choice",
            ExerciseType::ShortAnswer => "short_answer",
            ExerciseType::Voice => "voice",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(ExerciseType::MultipleChoice),
            "short_answer" => Ok(ExerciseType::ShortAnswer),
            "voice" => Ok(ExerciseType::Voice),
            other => Err(Error::InvalidInput(format!("Unknown exercise type: {}", other))),
        }
    }
}

/// One exercise attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseResponse {
    pub id: String,
    pub trainee_id: String,
    pub section_id: String,
    pub exercise_id: String,
    pub exercise_type: ExerciseType,
    pub response_text: Option<String>,
    pub audio_url: Option<String>,
    pub ai_feedback: Option<String>,
    pub ai_score: Option<i64>,
    pub correct: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when recording a new response
#[derive(Debug, Clone)]
pub struct NewResponse {
    pub trainee_id: String,
    pub section_id: String,
    pub exercise_id: String,
    pub exercise_type: ExerciseType,
    pub response_text: Option<String>,
    pub audio_url: Option<String>,
    pub ai_feedback: Option<String>,
    pub ai_score: Option<i64>,
    pub correct: Option<bool>,
}

/// Question id → selected option index
pub type AssessmentAnswers = BTreeMap<String, u32>;

/// One final-assessment submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentAttempt {
    pub id: String,
    pub trainee_id: String,
    pub score: i64,
    pub total: i64,
    pub answers: AssessmentAnswers,
    pub created_at: DateTime<Utc>,
}
