// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        question::PublicQuestion,
        quiz::{QuizHeader, QuizQuestionsResponse, QuizSummary},
    },
    store::DynStore,
};

/// Lists active quizzes (id, title, description).
pub async fn list_quizzes(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let quizzes: Vec<QuizSummary> = store
        .list_active_quizzes()
        .await?
        .into_iter()
        .map(QuizSummary::from)
        .collect();

    Ok(Json(quizzes))
}

/// Returns a quiz header and its questions.
///
/// Questions are mapped to `PublicQuestion` so the answer key is never exposed.
pub async fn get_quiz_questions(
    State(store): State<DynStore>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let questions: Vec<PublicQuestion> = store
        .list_questions(quiz.id)
        .await?
        .into_iter()
        .map(PublicQuestion::from)
        .collect();

    Ok(Json(QuizQuestionsResponse {
        quiz: QuizHeader {
            id: quiz.id,
            title: quiz.title,
            pass_threshold: quiz.pass_threshold,
        },
        questions,
    }))
}
