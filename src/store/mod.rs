// src/store/mod.rs

//! Persistence interface.
//!
//! Handlers and services only see `dyn Store`. The concrete backend is
//! picked once in `main` from configuration and injected through `AppState`.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    config::QuizDefaults,
    error::AppError,
    models::{
        question::{NewQuestion, Question},
        quiz::{NewQuiz, Quiz},
        result::{NewResult, QuizResult, ResultHistoryEntry},
        user::{NewUser, User},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DynStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// `email` must already be normalized.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn create_quiz(&self, quiz: NewQuiz, defaults: &QuizDefaults) -> Result<Quiz, AppError>;

    /// Fails with `NotFound` when the quiz does not exist. All-or-nothing.
    async fn add_questions(
        &self,
        quiz_id: Uuid,
        questions: Vec<NewQuestion>,
    ) -> Result<Vec<Question>, AppError>;

    async fn find_quiz(&self, id: Uuid) -> Result<Option<Quiz>, AppError>;

    async fn find_quiz_by_title(&self, title: &str) -> Result<Option<Quiz>, AppError>;

    /// Active quizzes in creation order.
    async fn list_active_quizzes(&self) -> Result<Vec<Quiz>, AppError>;

    /// Questions of a quiz in creation order.
    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, AppError>;

    /// Distinct questions among `ids` that belong to `quiz_id`.
    /// Foreign and unknown ids are silently dropped.
    async fn find_questions(&self, quiz_id: Uuid, ids: &[Uuid]) -> Result<Vec<Question>, AppError>;

    /// Single atomic insert; assigns id and creation time.
    async fn create_result(&self, result: NewResult) -> Result<QuizResult, AppError>;

    async fn find_result(&self, id: Uuid) -> Result<Option<QuizResult>, AppError>;

    /// Newest first.
    async fn list_results_for_user(&self, user_id: Uuid) -> Result<Vec<ResultHistoryEntry>, AppError>;
}
