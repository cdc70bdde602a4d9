//! Category model and DTOs.

use marknotes_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating a category. `color` falls back to the default.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    /// Missing is treated like blank and rejected by validation.
    #[serde(default)]
    pub name: String,
    pub color: Option<String>,
}

/// DTO for updating a category. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub color: Option<String>,
}
