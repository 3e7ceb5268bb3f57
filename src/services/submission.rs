// src/services/submission.rs

//! Submission engine: validates a set of answers against the catalog,
//! scores them and persists exactly one immutable result.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        question::Question,
        result::{Answer, NewResult, QuizResult, ScoredAnswer},
    },
    store::Store,
};

/// Outcome of scoring, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoring {
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub answers: Vec<ScoredAnswer>,
}

/// `round(100 * score / total)` with halves rounded up, in exact integer math.
/// 1 of 8 correct (12.5%) yields 13.
pub fn percentage(score: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * score + total) / (2 * total);
    rounded.min(100) as i32
}

pub fn is_passing(percentage: i32, pass_threshold: i32) -> bool {
    percentage >= pass_threshold
}

/// Scores `answers` against the already resolved `questions`.
///
/// Every answer must have a matching question and the number of resolved
/// questions must equal the number of answers. This rejects duplicate
/// question ids as well as ids from another quiz.
pub fn score_answers(answers: &[Answer], questions: &[Question]) -> Result<Scoring, AppError> {
    if questions.len() != answers.len() {
        return Err(AppError::BadRequest("Mismatch questions".to_string()));
    }

    let by_id: HashMap<Uuid, &Question> = questions.iter().map(|q| (q.id, q)).collect();

    let mut scored = Vec::with_capacity(answers.len());
    for answer in answers {
        let question = by_id
            .get(&answer.question_id)
            .ok_or_else(|| AppError::BadRequest("Mismatch questions".to_string()))?;
        scored.push(ScoredAnswer {
            question_id: answer.question_id,
            selected_option: answer.selected_option,
            correct: question.is_correct(answer.selected_option),
        });
    }

    let score = scored.iter().filter(|a| a.correct).count();
    let total = scored.len();

    Ok(Scoring {
        score: score as i32,
        total: total as i32,
        percentage: percentage(score, total),
        answers: scored,
    })
}

/// Validates, scores and persists one submission.
///
/// Checks run in order: non-empty answers, quiz exists, every answer
/// resolves to a distinct question of that quiz. Nothing is written unless
/// all checks pass. Repeated submissions create separate results.
pub async fn submit(
    store: &dyn Store,
    quiz_id: Uuid,
    user_id: Uuid,
    answers: &[Answer],
) -> Result<QuizResult, AppError> {
    if answers.is_empty() {
        return Err(AppError::BadRequest("No answers provided".to_string()));
    }

    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let question_ids: Vec<Uuid> = answers.iter().map(|a| a.question_id).collect();
    let questions = store.find_questions(quiz.id, &question_ids).await?;

    let scoring = score_answers(answers, &questions)?;
    let passed = is_passing(scoring.percentage, quiz.pass_threshold);

    let result = store
        .create_result(NewResult {
            user_id,
            quiz_id: quiz.id,
            score: scoring.score,
            total: scoring.total,
            percentage: scoring.percentage,
            passed,
            answers: scoring.answers,
        })
        .await?;

    tracing::info!(
        result_id = %result.id,
        quiz_id = %quiz.id,
        user_id = %user_id,
        score = result.score,
        total = result.total,
        passed,
        "Quiz submission scored"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::QuizDefaults,
        models::{question::NewQuestion, quiz::NewQuiz},
        store::MemoryStore,
    };

    /// Creates a quiz with five questions whose correct answer is always 0.
    async fn seed_quiz(store: &MemoryStore, pass_threshold: i32) -> (Uuid, Vec<Question>) {
        let quiz = store
            .create_quiz(
                NewQuiz {
                    title: "Rust Basics".into(),
                    description: "Ownership and borrowing".into(),
                    pass_threshold: Some(pass_threshold),
                    is_active: true,
                },
                &QuizDefaults::default(),
            )
            .await
            .unwrap();
        let questions = (0..5)
            .map(|i| NewQuestion {
                question_text: format!("Question {}", i),
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_answer: 0,
            })
            .collect();
        let questions = store.add_questions(quiz.id, questions).await.unwrap();
        (quiz.id, questions)
    }

    fn answer(q: &Question, selected_option: i32) -> Answer {
        Answer {
            question_id: q.id,
            selected_option,
        }
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(3, 8), 38); // 37.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn percentage_stays_within_bounds() {
        for total in 1..=40 {
            for score in 0..=total {
                let p = percentage(score, total);
                assert!((0..=100).contains(&p));
                let exact = 100.0 * score as f64 / total as f64;
                assert!((p as f64 - exact).abs() <= 0.5);
            }
        }
    }

    #[test]
    fn pass_verdict_is_inclusive() {
        assert!(is_passing(60, 60));
        assert!(!is_passing(60, 65));
    }

    #[tokio::test]
    async fn three_of_five_at_threshold_sixty_passes() {
        let store = MemoryStore::new();
        let (quiz_id, qs) = seed_quiz(&store, 60).await;
        let user = Uuid::new_v4();
        let answers = [
            answer(&qs[0], 0),
            answer(&qs[1], 0),
            answer(&qs[2], 0),
            answer(&qs[3], 1),
            answer(&qs[4], 2),
        ];

        let result = submit(&store, quiz_id, user, &answers).await.unwrap();
        assert_eq!((result.score, result.total, result.percentage), (3, 5, 60));
        assert!(result.passed);
        assert_eq!(result.answers.len(), 5);
        assert!(!result.answers[3].correct);
    }

    #[tokio::test]
    async fn three_of_five_at_threshold_sixty_five_fails() {
        let store = MemoryStore::new();
        let (quiz_id, qs) = seed_quiz(&store, 65).await;
        let answers = [
            answer(&qs[0], 0),
            answer(&qs[1], 0),
            answer(&qs[2], 0),
            answer(&qs[3], 1),
            answer(&qs[4], 1),
        ];

        let result = submit(&store, quiz_id, Uuid::new_v4(), &answers).await.unwrap();
        assert_eq!(result.percentage, 60);
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn partial_submission_scores_against_submitted_count() {
        let store = MemoryStore::new();
        let (quiz_id, qs) = seed_quiz(&store, 60).await;
        let answers = [answer(&qs[0], 0), answer(&qs[1], 0)];

        let result = submit(&store, quiz_id, Uuid::new_v4(), &answers).await.unwrap();
        assert_eq!((result.score, result.total, result.percentage), (2, 2, 100));
        assert!(result.passed);
    }

    #[tokio::test]
    async fn empty_answers_are_rejected() {
        let store = MemoryStore::new();
        let (quiz_id, _) = seed_quiz(&store, 60).await;
        let err = submit(&store, quiz_id, Uuid::new_v4(), &[]).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unknown_quiz_is_not_found() {
        let store = MemoryStore::new();
        let (_, qs) = seed_quiz(&store, 60).await;
        let err = submit(&store, Uuid::new_v4(), Uuid::new_v4(), &[answer(&qs[0], 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn foreign_question_is_rejected_without_writing() {
        let store = MemoryStore::new();
        let (quiz_id, qs) = seed_quiz(&store, 60).await;
        let user = Uuid::new_v4();
        let foreign = Answer {
            question_id: Uuid::new_v4(),
            selected_option: 0,
        };

        let err = submit(&store, quiz_id, user, &[answer(&qs[0], 0), foreign])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(store.list_results_for_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_question_ids_are_rejected() {
        let store = MemoryStore::new();
        let (quiz_id, qs) = seed_quiz(&store, 60).await;
        let err = submit(
            &store,
            quiz_id,
            Uuid::new_v4(),
            &[answer(&qs[0], 0), answer(&qs[0], 0)],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn out_of_range_option_counts_as_incorrect() {
        let store = MemoryStore::new();
        let (quiz_id, qs) = seed_quiz(&store, 60).await;
        let result = submit(&store, quiz_id, Uuid::new_v4(), &[answer(&qs[0], 42)])
            .await
            .unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.percentage, 0);
    }

    #[tokio::test]
    async fn identical_submissions_create_distinct_results() {
        let store = MemoryStore::new();
        let (quiz_id, qs) = seed_quiz(&store, 60).await;
        let user = Uuid::new_v4();
        let answers = [answer(&qs[0], 0), answer(&qs[1], 2)];

        let first = submit(&store, quiz_id, user, &answers).await.unwrap();
        let second = submit(&store, quiz_id, user, &answers).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(
            (first.score, first.total, first.percentage, first.passed),
            (second.score, second.total, second.percentage, second.passed)
        );
        assert_eq!(store.list_results_for_user(user).await.unwrap().len(), 2);
    }
}
