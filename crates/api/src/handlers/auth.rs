//! Handlers for the `/auth` resource (register, login, me, logout).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use marknotes_core::accounts::{normalize_email, normalize_full_name, validate_email};
use marknotes_core::types::DbId;
use marknotes_db::models::session::CreateSession;
use marknotes_db::models::user::{CreateUser, UserInfo};
use marknotes_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::{AuthUser, BearerClaims};
use crate::response::MessageResponse;
use crate::state::AppState;

/// Longest `User-Agent` value recorded on a session.
const MAX_USER_AGENT_LENGTH: usize = 512;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "fullName", alias = "full_name", default)]
    pub full_name: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

/// Response body for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserInfo,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&input.email);
    validate_email(&email).map_err(AppError::validation)?;
    validate_password_strength(&input.password, state.config.password_min_length)
        .map_err(AppError::validation)?;
    let full_name = normalize_full_name(input.full_name.as_deref()).map_err(AppError::validation)?;

    if UserRepo::email_exists(&state.pool, &email).await? {
        return Err(AppError::validation("Email is already registered"));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            full_name,
            password_hash,
        },
    )
    .await
    .map_err(map_duplicate_email)?;

    let token = issue_session(&state, user.id, &headers).await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful".to_string(),
            token,
            user: UserInfo::from(&user),
        }),
    ))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&input.email);

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        tracing::warn!(user_id = user.id, "Failed login attempt");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let removed = SessionRepo::cleanup_for_user(&state.pool, user.id).await?;
    if removed > 0 {
        tracing::debug!(user_id = user.id, removed, "Pruned stale sessions");
    }

    let token = issue_session(&state, user.id, &headers).await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserInfo::from(&user),
    }))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MeResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

    Ok(Json(MeResponse {
        user: UserInfo::from(&user),
    }))
}

/// POST /api/auth/logout
///
/// Revokes the session backing the presented token. Requires a correctly
/// signed token but not a live session, so repeating a logout succeeds.
pub async fn logout(
    State(state): State<AppState>,
    claims: BearerClaims,
) -> AppResult<Json<MessageResponse>> {
    let revoked = SessionRepo::revoke(&state.pool, claims.token_id, claims.user_id).await?;

    tracing::info!(user_id = claims.user_id, revoked, "User logged out");

    Ok(Json(MessageResponse::new("Logout successful")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign a token and persist the session row that backs it.
async fn issue_session(state: &AppState, user_id: DbId, headers: &HeaderMap) -> AppResult<String> {
    let issued = generate_access_token(user_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect());

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id,
            token_id: issued.token_id,
            expires_at: issued.expires_at,
            user_agent,
        },
    )
    .await?;

    Ok(issued.token)
}

/// A concurrent registration can still lose the race on `uq_users_email`;
/// report it the same way as the pre-check.
fn map_duplicate_email(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some("uq_users_email") {
            return AppError::validation("Email is already registered");
        }
    }
    AppError::Database(err)
}
