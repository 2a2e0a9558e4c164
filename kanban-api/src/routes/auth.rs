//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/auth/register` - Register new user
//! - `POST /v1/auth/login` - Login and get tokens
//! - `POST /v1/auth/refresh` - Refresh access token
//! - `GET /v1/auth/profile` - Current user (authenticated)

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{extract::State, http::StatusCode, Extension, Json};
use kanban_shared::{
    auth::{
        jwt::{self, TokenPair},
        middleware::AuthContext,
    },
    models::user::User,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Strength is checked by the user service
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

fn issue_tokens(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let tokens = jwt::issue_token_pair(
        user.id,
        &user.email,
        state.jwt_secret(),
        state.token_lifetimes(),
    )?;

    Ok(AuthResponse { user, tokens })
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "Secret123"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "user": { "id": "uuid", "email": "user@example.com", ... },
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "expires_in": 86400
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or weak password
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = state.services.users.register(&req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "Secret123"
/// }
/// ```
///
/// # Response
///
/// Same body as register, with `200 OK`.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .services
        .users
        .authenticate(&req.email, &req.password)
        .await?;

    Ok(Json(issue_tokens(&state, user)?))
}

/// Token refresh endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/refresh
/// Content-Type: application/json
///
/// {
///   "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired or non-refresh token
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let lifetime = state.token_lifetimes().access;
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret(), lifetime)?;

    Ok(Json(RefreshResponse {
        access_token,
        expires_in: lifetime.num_seconds(),
    }))
}

/// `GET /v1/auth/profile`
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = state.services.users.profile(auth.user_id).await?;
    Ok(Json(ProfileResponse { user }))
}
