// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;

use crate::error::AppError;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,

    pub quiz_id: Uuid,

    /// The text content of the question.
    pub question_text: String,

    /// Ordered list of options (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// Zero-based index into `options`.
    pub correct_answer: i32,
}

impl Question {
    pub fn is_correct(&self, selected_option: i32) -> bool {
        self.correct_answer == selected_option
    }
}

/// DTO for sending question to client (excludes the answer key).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question_text: String,
    pub options: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            options: q.options.0,
        }
    }
}

/// Insert payload for a question of an existing quiz.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: i32,
}

impl NewQuestion {
    /// The answer key must point at one of the options.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.question_text.trim().is_empty() {
            return Err(AppError::BadRequest("Question text is required".to_string()));
        }
        if self.options.is_empty() {
            return Err(AppError::BadRequest("Options cannot be empty".to_string()));
        }
        let in_range = usize::try_from(self.correct_answer)
            .map(|idx| idx < self.options.len())
            .unwrap_or(false);
        if !in_range {
            return Err(AppError::BadRequest(format!(
                "Correct answer index {} is out of range",
                self.correct_answer
            )));
        }
        Ok(())
    }
}
