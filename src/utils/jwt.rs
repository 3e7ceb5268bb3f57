// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user::{PublicUser, User},
    state::AppState,
    store::Store,
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID.
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new JWT for the user, valid for `expiration_seconds`.
pub fn sign_jwt(user: &User, secret: &str, expiration_seconds: u64) -> Result<String, AppError> {
    // Calculate expiration: current time + expiration_seconds
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Resolves a bearer token to a user identity.
///
/// The token must verify and its subject must still exist in the store.
pub async fn authenticate(
    store: &dyn Store,
    secret: &str,
    token: &str,
) -> Result<PublicUser, AppError> {
    let claims = verify_jwt(token, secret)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    let user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    Ok(user.to_public())
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(value: Option<&str>) -> Option<&str> {
    value
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header.
/// If valid, injects the resolved `PublicUser` into the request extensions.
/// If invalid, returns 401 Unauthorized.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = bearer_token(auth_header)
        .ok_or(AppError::AuthError("Missing token".to_string()))?;

    let user = authenticate(state.store.as_ref(), &state.config.jwt_secret, token).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::user::NewUser, store::MemoryStore};

    const SECRET: &str = "unit_test_secret";

    async fn registered(store: &MemoryStore) -> User {
        store
            .create_user(NewUser {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap()
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[tokio::test]
    async fn token_round_trips_to_identity() {
        let store = MemoryStore::new();
        let user = registered(&store).await;
        let token = sign_jwt(&user, SECRET, 60).unwrap();

        let identity = authenticate(&store, SECRET, &token).await.unwrap();
        assert_eq!(identity, user.to_public());
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let store = MemoryStore::new();
        let user = registered(&store).await;
        let token = sign_jwt(&user, SECRET, 60).unwrap();

        let err = authenticate(&store, "other_secret", &token).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn token_for_unknown_user_is_unauthorized() {
        let other_store = MemoryStore::new();
        let user = registered(&other_store).await;
        let token = sign_jwt(&user, SECRET, 60).unwrap();

        let err = authenticate(&MemoryStore::new(), SECRET, &token).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }
}
