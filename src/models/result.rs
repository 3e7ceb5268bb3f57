// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

/// One submitted answer. Ephemeral: validated and turned into a `ScoredAnswer`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: Uuid,
    pub selected_option: i32,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// A submitted answer annotated with its correctness. Computed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAnswer {
    pub question_id: Uuid,
    pub selected_option: i32,
    pub correct: bool,
}

/// Represents the 'results' table in the database.
/// Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    /// Number of correct answers.
    pub score: i32,
    /// Number of submitted answers.
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
    pub answers: Json<Vec<ScoredAnswer>>,
    pub created_at: DateTime<Utc>,
}

/// Computed fields of a result before the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
    pub answers: Vec<ScoredAnswer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub result_id: Uuid,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
}

impl From<&QuizResult> for SubmissionResponse {
    fn from(r: &QuizResult) -> Self {
        Self {
            result_id: r.id,
            score: r.score,
            total: r.total,
            percentage: r.percentage,
            passed: r.passed,
        }
    }
}

/// DTO for `GET /results/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDetail {
    pub id: Uuid,
    pub quiz_title: String,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
    pub created_at: DateTime<Utc>,
}

/// Aggregated struct for the attempt history.
/// Represents a row joined from `results` and `quizzes`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResultHistoryEntry {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub quiz_title: String,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
    pub created_at: DateTime<Utc>,
}
