/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `GET /v1/me` - The authenticated caller
///
/// A user's email, lowercased, is the identity stored as project creator,
/// assignee and task author.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trackhub_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked against the strength rules after basic validation
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar_url: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user_id: Uuid,

    /// Identity the tokens carry
    pub email: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// The authenticated caller
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<TokenResponse> {
    let (access_token, refresh_token) =
        jwt::issue_token_pair(user.id, &user.email, user.display_name(), state.jwt_secret())?;

    Ok(TokenResponse {
        user_id: user.id,
        email: user.email.clone(),
        access_token,
        refresh_token,
    })
}

/// Registers a new user
///
/// ```text
/// POST /v1/auth/register
///
/// { "email": "ada@example.com", "password": "correct horse 42", "name": "Ada" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password, &req.email)
        .map_err(|e| ApiError::invalid_field("password", e.to_string()))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name.filter(|n| !n.trim().is_empty()),
            avatar_url: req.avatar_url,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(issue_tokens(&state, &user)?)))
}

/// Authenticates a user and returns JWT tokens
///
/// ```text
/// POST /v1/auth/login
///
/// { "email": "ada@example.com", "password": "correct horse 42" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected");
        return Err(invalid());
    }

    User::update_last_login(&state.db, user.id).await?;

    Ok(Json(issue_tokens(&state, &user)?))
}

/// Exchanges a refresh token for a new access token
///
/// ```text
/// POST /v1/auth/refresh
///
/// { "refresh_token": "eyJ..." }
/// ```
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Returns the caller's profile
///
/// # Errors
///
/// - `401 Unauthorized`: The account behind the token no longer exists
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(MeResponse {
        user_id: user.id,
        name: user.display_name().to_string(),
        email: user.email,
        avatar_url: user.avatar_url,
        created_at: user.created_at,
    }))
}
