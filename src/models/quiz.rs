// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::config::QuizDefaults;
use crate::error::AppError;
use crate::models::question::PublicQuestion;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,

    /// Minimum percentage (0-100) required to pass.
    pub pass_threshold: i32,

    /// Only active quizzes are listed publicly.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

/// Insert payload for the quizzes table.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub description: String,
    /// `None` takes the configured default.
    pub pass_threshold: Option<i32>,
    pub is_active: bool,
}

impl NewQuiz {
    pub fn resolved_pass_threshold(&self, defaults: &QuizDefaults) -> i32 {
        self.pass_threshold.unwrap_or(defaults.pass_threshold)
    }

    /// Checks the title and the resolved threshold before insertion.
    pub fn validate(&self, defaults: &QuizDefaults) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::BadRequest("Quiz title is required".to_string()));
        }
        let threshold = self.resolved_pass_threshold(defaults);
        if !(0..=100).contains(&threshold) {
            return Err(AppError::BadRequest(format!(
                "Pass threshold {} must be between 0 and 100",
                threshold
            )));
        }
        Ok(())
    }
}

/// Public listing entry for `GET /quizzes`.
#[derive(Debug, Serialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

impl From<Quiz> for QuizSummary {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHeader {
    pub id: Uuid,
    pub title: String,
    pub pass_threshold: i32,
}

/// DTO for the quiz-taking page: questions without their answer keys.
#[derive(Debug, Serialize)]
pub struct QuizQuestionsResponse {
    pub quiz: QuizHeader,
    pub questions: Vec<PublicQuestion>,
}
