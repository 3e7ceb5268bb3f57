// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, normalize_email},
    store::DynStore,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with a token and the public user object.
pub async fn register(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = normalize_email(&payload.email);
    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    // The store still enforces uniqueness for concurrent registrations.
    let user = store
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.to_public(),
        }),
    ))
}

/// Authenticates a user and returns a JWT token.
///
/// Unknown email and wrong password produce the same 401 response.
pub async fn login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let invalid = || AppError::AuthError("Invalid credentials".to_string());

    let user = store
        .find_user_by_email(&normalize_email(&payload.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(AuthResponse {
        token,
        user: user.to_public(),
    }))
}
