// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
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

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Email already registered".to_string())
            }
            _ => {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_quiz(&self, quiz: NewQuiz, defaults: &QuizDefaults) -> Result<Quiz, AppError> {
        quiz.validate(defaults)?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (id, title, description, pass_threshold, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, pass_threshold, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(quiz.resolved_pass_threshold(defaults))
        .bind(quiz.is_active)
        .fetch_one(&self.pool)
        .await?;
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

        let mut tx = self.pool.begin().await?;

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }

        let mut created = Vec::with_capacity(questions.len());
        for q in questions {
            let question = sqlx::query_as::<_, Question>(
                r#"
                INSERT INTO questions (id, quiz_id, question_text, options, correct_answer)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, quiz_id, question_text, options, correct_answer
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(quiz_id)
            .bind(&q.question_text)
            .bind(Json(&q.options))
            .bind(q.correct_answer)
            .fetch_one(&mut *tx)
            .await?;
            created.push(question);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn find_quiz(&self, id: Uuid) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, description, pass_threshold, is_active, created_at
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn find_quiz_by_title(&self, title: &str) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, description, pass_threshold, is_active, created_at
            FROM quizzes
            WHERE title = $1
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn list_active_quizzes(&self) -> Result<Vec<Quiz>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, description, pass_threshold, is_active, created_at
            FROM quizzes
            WHERE is_active = TRUE
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(quizzes)
    }

    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, quiz_id, question_text, options, correct_answer
            FROM questions
            WHERE quiz_id = $1
            ORDER BY position
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn find_questions(&self, quiz_id: Uuid, ids: &[Uuid]) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, quiz_id, question_text, options, correct_answer
            FROM questions
            WHERE quiz_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(quiz_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn create_result(&self, result: NewResult) -> Result<QuizResult, AppError> {
        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            INSERT INTO results (id, user_id, quiz_id, score, total, percentage, passed, answers)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, quiz_id, score, total, percentage, passed, answers, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(result.user_id)
        .bind(result.quiz_id)
        .bind(result.score)
        .bind(result.total)
        .bind(result.percentage)
        .bind(result.passed)
        .bind(Json(&result.answers))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert result: {:?}", e);
            AppError::from(e)
        })?;
        Ok(result)
    }

    async fn find_result(&self, id: Uuid) -> Result<Option<QuizResult>, AppError> {
        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT id, user_id, quiz_id, score, total, percentage, passed, answers, created_at
            FROM results
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }

    async fn list_results_for_user(&self, user_id: Uuid) -> Result<Vec<ResultHistoryEntry>, AppError> {
        let history = sqlx::query_as::<_, ResultHistoryEntry>(
            r#"
            SELECT
                r.id,
                r.quiz_id,
                q.title AS quiz_title,
                r.score,
                r.total,
                r.percentage,
                r.passed,
                r.created_at
            FROM results r
            JOIN quizzes q ON r.quiz_id = q.id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }
}
