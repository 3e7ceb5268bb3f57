// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    handlers::{auth, health, quiz, result},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, results).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store + config).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/{quiz_id}/questions", get(quiz::get_quiz_questions))
                .layer(require_auth.clone()),
        );

    let result_routes = Router::new()
        .route("/me", get(result::list_my_results))
        .route("/quiz/{quiz_id}/submit", post(result::submit_answers))
        .route("/{result_id}", get(result::get_result))
        .route("/{result_id}/certificate.pdf", get(result::download_certificate))
        .layer(require_auth);

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/results", result_routes)
        .fallback(route_not_found)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
