//! Bearer-token authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use marknotes_core::types::DbId;
use marknotes_db::repositories::SessionRepo;
use uuid::Uuid;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Claims of a correctly signed, unexpired Bearer token.
///
/// Does not consult the session table; use [`AuthUser`] for anything that
/// reads or writes user data.
#[derive(Debug, Clone)]
pub struct BearerClaims {
    pub user_id: DbId,
    pub token_id: Uuid,
}

impl FromRequestParts<AppState> for BearerClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })?;

        let claims = validate_token(token.trim(), &state.config.jwt)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        let token_id = Uuid::parse_str(&claims.jti)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        Ok(BearerClaims {
            user_id: claims.sub,
            token_id,
        })
    }
}

/// Authenticated caller.
///
/// The token must carry a valid signature, be unexpired, and name a session
/// row that has not been revoked. Any failure rejects with 401.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The session's token id (from `claims.jti`).
    pub token_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = BearerClaims::from_request_parts(parts, state).await?;

        SessionRepo::find_active(&state.pool, claims.token_id)
            .await?
            .filter(|s| s.user_id == claims.user_id)
            .ok_or_else(|| AppError::unauthorized("Session has ended. Please sign in again"))?;

        Ok(AuthUser {
            user_id: claims.user_id,
            token_id: claims.token_id,
        })
    }
}
