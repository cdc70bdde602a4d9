//! Tag and note-tag models and DTOs.

use marknotes_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tags` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

/// A tag joined through `note_tags`, carrying the note it is attached to.
#[derive(Debug, Clone, FromRow)]
pub struct NoteTag {
    pub note_id: DbId,
    #[sqlx(flatten)]
    pub tag: Tag,
}

/// DTO for creating (upserting) a tag. The name is normalized before storage.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    /// Missing is treated like blank and rejected by validation.
    #[serde(default)]
    pub name: String,
    pub color: Option<String>,
}

/// DTO for updating a tag. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<String>,
}
