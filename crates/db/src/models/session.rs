//! Session model and DTOs.

use marknotes_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `sessions` table. `token_id` is the `jti` claim of the
/// access token the session backs.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub token_id: Uuid,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: DbId,
    pub token_id: Uuid,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
}
