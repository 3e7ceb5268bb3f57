// src/seed.rs

//! Demo catalog and demo user, inserted at start-up when enabled.
//! Existing quizzes (matched by title) and users (matched by email) are kept.

use crate::{
    config::QuizDefaults,
    error::AppError,
    models::{
        question::NewQuestion,
        quiz::NewQuiz,
        user::NewUser,
    },
    store::Store,
    utils::hash::hash_password,
};

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "Password123";

struct SeedQuiz {
    title: &'static str,
    description: &'static str,
    pass_threshold: i32,
    questions: &'static [(&'static str, &'static [&'static str], i32)],
}

const DEMO_QUIZZES: &[SeedQuiz] = &[
    SeedQuiz {
        title: "JavaScript Fundamentals",
        description: "Essential JavaScript programming concepts and syntax",
        pass_threshold: 60,
        questions: &[
            (
                "Which keyword declares a block-scoped variable?",
                &["var", "let", "const", "both let and const"],
                3,
            ),
            (
                "What is the output of typeof null?",
                &["null", "object", "undefined", "number"],
                1,
            ),
            (
                "Which array method creates a new array with filtered items?",
                &["forEach", "map", "filter", "reduce"],
                2,
            ),
            (
                "Which symbol is used for strict equality?",
                &["==", "=", "===", "!=="],
                2,
            ),
            (
                "What does JSON stand for?",
                &[
                    "Java Source Open Network",
                    "JavaScript Object Notation",
                    "Java Serialized Object Notation",
                    "None",
                ],
                1,
            ),
        ],
    },
    SeedQuiz {
        title: "React Development",
        description: "Modern React development with hooks and components",
        pass_threshold: 65,
        questions: &[
            (
                "Which hook is used to manage component state?",
                &["useEffect", "useState", "useContext", "useReducer"],
                1,
            ),
            (
                "What is JSX?",
                &["JavaScript XML", "Java Syntax Extension", "JSON Extended", "JavaScript Express"],
                0,
            ),
            (
                "Which method is used to create a React component?",
                &[
                    "React.component()",
                    "function Component()",
                    "class Component extends React.Component",
                    "Both B and C",
                ],
                3,
            ),
            (
                "What does useEffect hook do?",
                &["Manages state", "Handles side effects", "Creates context", "Renders components"],
                1,
            ),
            (
                "How do you pass data from parent to child component?",
                &["Using state", "Using props", "Using context", "Using hooks"],
                1,
            ),
        ],
    },
];

pub async fn seed_demo_data(store: &dyn Store, defaults: &QuizDefaults) -> Result<(), AppError> {
    for seed in DEMO_QUIZZES {
        if store.find_quiz_by_title(seed.title).await?.is_some() {
            continue;
        }

        let quiz = store
            .create_quiz(
                NewQuiz {
                    title: seed.title.to_string(),
                    description: seed.description.to_string(),
                    pass_threshold: Some(seed.pass_threshold),
                    is_active: true,
                },
                defaults,
            )
            .await?;

        let questions = seed
            .questions
            .iter()
            .map(|(text, options, correct)| NewQuestion {
                question_text: text.to_string(),
                options: options.iter().map(|o| o.to_string()).collect(),
                correct_answer: *correct,
            })
            .collect();
        store.add_questions(quiz.id, questions).await?;

        tracing::info!("Seeded quiz: {}", seed.title);
    }

    if store.find_user_by_email(DEMO_EMAIL).await?.is_none() {
        store
            .create_user(NewUser {
                name: "Demo User".to_string(),
                email: DEMO_EMAIL.to_string(),
                password_hash: hash_password(DEMO_PASSWORD)?,
            })
            .await?;
        tracing::info!("Seeded demo user: {}", DEMO_EMAIL);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = MemoryStore::new();
        let defaults = QuizDefaults::default();

        seed_demo_data(&store, &defaults).await.unwrap();
        seed_demo_data(&store, &defaults).await.unwrap();

        let quizzes = store.list_active_quizzes().await.unwrap();
        assert_eq!(quizzes.len(), DEMO_QUIZZES.len());
        for quiz in &quizzes {
            assert_eq!(store.list_questions(quiz.id).await.unwrap().len(), 5);
        }
        assert!(store.find_user_by_email(DEMO_EMAIL).await.unwrap().is_some());
    }

    #[test]
    fn seed_answer_keys_are_in_range() {
        for quiz in DEMO_QUIZZES {
            for (_, options, correct) in quiz.questions {
                assert!((*correct as usize) < options.len());
            }
        }
    }
}
