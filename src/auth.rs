//! Accounts and bearer authentication.
//!
//! Passwords are stored as argon2 PHC strings; logins are exchanged for
//! HS256 tokens signed with the configured secret. The middleware
//! verifies the token and hands the owner id to the todo handlers as a
//! request extension, so they never see an unauthenticated call.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

use crate::api::AppState;
use crate::error::ApiError;
use crate::models::{LoginRequest, SignupRequest};
use crate::validate;

/// Verified owner id, inserted by the middleware and consumed by the
/// todo handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owner id.
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Hash verified against when the email is unknown, so a login against
/// a missing account costs the same as one against a real account.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("not-a-real-password").unwrap_or_default()
    })
}

pub fn issue_token(secret: &str, ttl_hours: i64, user_id: &str) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e).into())
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::InvalidToken)
}

/// Bearer middleware for the todo routes.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::MissingAuthHeader)?;

    let token = match header_value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(' ') => token,
        _ => return Err(ApiError::InvalidAuthFormat),
    };

    let claims = verify_token(&state.config.auth.secret, token)?;
    request.extensions_mut().insert(AuthUser(claims.sub));

    Ok(next.run(request).await)
}

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password), Some(name)) =
        (&request.email, &request.password, &request.name)
    else {
        return Err(ApiError::MissingFields("email, password, name"));
    };

    validate::validate_email(email)?;
    validate::validate_password(password)?;
    validate::validate_name(name)?;

    let password_hash = hash_password(password)?;
    let user = state.db.create_user(email, &password_hash, name)?;

    tracing::info!(user_id = %user.id, "account created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "User created successfully",
            "data": {
                "userId": user.id,
                "email": user.email,
                "name": user.name,
                "createdAt": user.created_at,
            },
        })),
    )
        .into_response())
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (&request.email, &request.password) else {
        return Err(ApiError::MissingFields("email, password"));
    };

    let user = state.db.find_user_by_email(email)?;
    let verified = match &user {
        Some(user) => verify_password(password, &user.password_hash),
        None => {
            // burn a verification anyway, then fail
            verify_password(password, dummy_hash());
            false
        }
    };
    let user = match (user, verified) {
        (Some(user), true) => user,
        _ => return Err(ApiError::InvalidCredentials),
    };

    let token = issue_token(
        &state.config.auth.secret,
        state.config.auth.token_ttl_hours,
        &user.id,
    )?;

    tracing::info!(user_id = %user.id, "login");

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Login successful",
        "data": {
            "token": token,
            "user": {
                "userId": user.id,
                "email": user.email,
                "name": user.name,
            },
        },
    }))
    .into_response())
}
