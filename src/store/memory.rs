// src/store/memory.rs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;
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
    store::Store,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    quizzes: Vec<Quiz>,
    questions: Vec<Question>,
    results: Vec<QuizResult>,
}

/// In-process store. Used by tests and when no `DATABASE_URL` is configured.
/// Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_quiz(&self, quiz: NewQuiz, defaults: &QuizDefaults) -> Result<Quiz, AppError> {
        quiz.validate(defaults)?;

        let quiz = Quiz {
            id: Uuid::new_v4(),
            pass_threshold: quiz.resolved_pass_threshold(defaults),
            title: quiz.title,
            description: quiz.description,
            is_active: quiz.is_active,
            created_at: Utc::now(),
        };
        self.tables.write().await.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn add_questions(
        &self,
        quiz_id: Uuid,
        questions: Vec<NewQuestion>,
    ) -> Result<Vec<Question>, AppError> {
        for q in &questions {
            q.validate()?;
        }

        let mut tables = self.tables.write().await;
        if !tables.quizzes.iter().any(|q| q.id == quiz_id) {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }

        let created: Vec<Question> = questions
            .into_iter()
            .map(|q| Question {
                id: Uuid::new_v4(),
                quiz_id,
                question_text: q.question_text,
                options: Json(q.options),
                correct_answer: q.correct_answer,
            })
            .collect();
        tables.questions.extend(created.iter().cloned());
        Ok(created)
    }

    async fn find_quiz(&self, id: Uuid) -> Result<Option<Quiz>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.quizzes.iter().find(|q| q.id == id).cloned())
    }

    async fn find_quiz_by_title(&self, title: &str) -> Result<Option<Quiz>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.quizzes.iter().find(|q| q.title == title).cloned())
    }

    async fn list_active_quizzes(&self) -> Result<Vec<Quiz>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.quizzes.iter().filter(|q| q.is_active).cloned().collect())
    }

    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn find_questions(&self, quiz_id: Uuid, ids: &[Uuid]) -> Result<Vec<Question>, AppError> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id && wanted.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn create_result(&self, result: NewResult) -> Result<QuizResult, AppError> {
        let result = QuizResult {
            id: Uuid::new_v4(),
            user_id: result.user_id,
            quiz_id: result.quiz_id,
            score: result.score,
            total: result.total,
            percentage: result.percentage,
            passed: result.passed,
            answers: Json(result.answers),
            created_at: Utc::now(),
        };
        self.tables.write().await.results.push(result.clone());
        Ok(result)
    }

    async fn find_result(&self, id: Uuid) -> Result<Option<QuizResult>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.results.iter().find(|r| r.id == id).cloned())
    }

    async fn list_results_for_user(&self, user_id: Uuid) -> Result<Vec<ResultHistoryEntry>, AppError> {
        let tables = self.tables.read().await;
        let titles: HashMap<Uuid, &str> = tables
            .quizzes
            .iter()
            .map(|q| (q.id, q.title.as_str()))
            .collect();

        // Results are appended in creation order, so reverse for newest first.
        Ok(tables
            .results
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .map(|r| ResultHistoryEntry {
                id: r.id,
                quiz_id: r.quiz_id,
                quiz_title: titles.get(&r.quiz_id).copied().unwrap_or_default().to_string(),
                score: r.score,
                total: r.total,
                percentage: r.percentage,
                passed: r.passed,
                created_at: r.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    fn new_quiz(title: &str, active: bool) -> NewQuiz {
        NewQuiz {
            title: title.into(),
            description: String::new(),
            pass_threshold: None,
            is_active: active,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("ada@example.com")).await.unwrap();
        let err = store.create_user(new_user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn quiz_takes_configured_default_threshold() {
        let store = MemoryStore::new();
        let quiz = store
            .create_quiz(new_quiz("Rust", true), &QuizDefaults { pass_threshold: 80 })
            .await
            .unwrap();
        assert_eq!(quiz.pass_threshold, 80);
    }

    #[tokio::test]
    async fn out_of_range_threshold_is_rejected_and_not_stored() {
        let store = MemoryStore::new();
        let mut quiz = new_quiz("Too strict", true);
        quiz.pass_threshold = Some(150);

        let err = store.create_quiz(quiz, &QuizDefaults::default()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(store.find_quiz_by_title("Too strict").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inactive_quizzes_are_not_listed() {
        let store = MemoryStore::new();
        let defaults = QuizDefaults::default();
        store.create_quiz(new_quiz("Live", true), &defaults).await.unwrap();
        store.create_quiz(new_quiz("Hidden", false), &defaults).await.unwrap();

        let listed = store.list_active_quizzes().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Live");
    }

    #[tokio::test]
    async fn find_questions_ignores_foreign_and_duplicate_ids() {
        let store = MemoryStore::new();
        let defaults = QuizDefaults::default();
        let a = store.create_quiz(new_quiz("A", true), &defaults).await.unwrap();
        let b = store.create_quiz(new_quiz("B", true), &defaults).await.unwrap();
        let question = || NewQuestion {
            question_text: "?".into(),
            options: vec!["x".into(), "y".into()],
            correct_answer: 0,
        };
        let qa = store.add_questions(a.id, vec![question()]).await.unwrap();
        let qb = store.add_questions(b.id, vec![question()]).await.unwrap();

        let found = store
            .find_questions(a.id, &[qa[0].id, qa[0].id, qb[0].id, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, qa[0].id);
    }

    #[tokio::test]
    async fn add_questions_to_missing_quiz_is_not_found() {
        let store = MemoryStore::new();
        let err = store.add_questions(Uuid::new_v4(), vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
