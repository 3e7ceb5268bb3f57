// src/handlers/result.rs

use axum::{
    Extension, Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::{
        result::{QuizResult, ResultDetail, SubmissionResponse, SubmitAnswersRequest},
        user::PublicUser,
    },
    services::{
        certificate::{self, CertificateInput},
        submission,
    },
    store::{DynStore, Store},
};

/// Submits answers for a quiz and returns the scored result.
///
/// The body is decoded by hand so that malformed answers map to 400.
pub async fn submit_answers(
    State(store): State<DynStore>,
    Extension(user): Extension<PublicUser>,
    Path(quiz_id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let req: SubmitAnswersRequest = serde_json::from_value(body)?;

    let result = submission::submit(store.as_ref(), quiz_id, user.id, &req.answers).await?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(&result))))
}

/// Lists the caller's attempts, newest first.
pub async fn list_my_results(
    State(store): State<DynStore>,
    Extension(user): Extension<PublicUser>,
) -> Result<impl IntoResponse, AppError> {
    let history = store.list_results_for_user(user.id).await?;
    Ok(Json(history))
}

/// Loads a result and checks that `user` owns it.
async fn owned_result(
    store: &dyn Store,
    result_id: Uuid,
    user: &PublicUser,
) -> Result<QuizResult, AppError> {
    let result = store
        .find_result(result_id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    if result.user_id != user.id {
        tracing::warn!(result_id = %result_id, user_id = %user.id, "Result access denied");
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }

    Ok(result)
}

/// Returns a single result (owner only).
pub async fn get_result(
    State(store): State<DynStore>,
    Extension(user): Extension<PublicUser>,
    Path(result_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = owned_result(store.as_ref(), result_id, &user).await?;

    let quiz = store.find_quiz(result.quiz_id).await?.ok_or_else(|| {
        AppError::InternalServerError(format!("Quiz {} of result {} is missing", result.quiz_id, result.id))
    })?;

    Ok(Json(ResultDetail {
        id: result.id,
        quiz_title: quiz.title,
        score: result.score,
        total: result.total,
        percentage: result.percentage,
        passed: result.passed,
        created_at: result.created_at,
    }))
}

/// Streams the PDF certificate of a result (owner only).
///
/// Rendered for passing and failing results alike unless
/// `CERT_REQUIRE_PASS` is enabled.
pub async fn download_certificate(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Extension(user): Extension<PublicUser>,
    Path(result_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let result = owned_result(store.as_ref(), result_id, &user).await?;

    if config.cert_require_pass && !result.passed {
        return Err(AppError::Forbidden(
            "Certificate is only available for passing results".to_string(),
        ));
    }

    let quiz = store.find_quiz(result.quiz_id).await?.ok_or_else(|| {
        AppError::InternalServerError(format!("Quiz {} of result {} is missing", result.quiz_id, result.id))
    })?;
    let student = store.find_user_by_id(result.user_id).await?.ok_or_else(|| {
        AppError::InternalServerError(format!("User {} of result {} is missing", result.user_id, result.id))
    })?;

    let stream = certificate::render_stream(CertificateInput {
        student_name: student.name,
        quiz_title: quiz.title,
        score_percent: result.percentage,
        passed: result.passed,
        issued_at: result.created_at,
        org_name: config.cert_org_name.clone(),
    })?;

    tracing::info!(result_id = %result.id, user_id = %user.id, "Streaming certificate");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"certificate-{}.pdf\"", result.id),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
