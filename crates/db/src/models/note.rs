//! Note model, the nested note representation, and DTOs.

use marknotes_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::category::Category;
use super::double_option;
use super::tag::Tag;

/// A row from the `notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub category_id: Option<DbId>,
    pub user_id: DbId,
    pub is_favorite: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A note with its category and tags resolved.
///
/// Serializes flat: the note's own fields plus `category` (object or null)
/// and `tags` (tag entities, not join rows).
#[derive(Debug, Clone, Serialize)]
pub struct NoteWithRelations {
    #[serde(flatten)]
    pub note: Note,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
}

/// DTO for creating a note. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNote {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<DbId>,
    pub is_favorite: Option<bool>,
}

/// Resolved values for a note insert (defaults already applied).
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub category_id: Option<DbId>,
    pub is_favorite: bool,
}

/// DTO for updating a note.
///
/// `category_id` distinguishes an absent key (keep) from `null` (clear).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<DbId>>,
    pub is_favorite: Option<bool>,
}

/// DTO for `PATCH /notes/{id}/favorite`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetFavorite {
    pub is_favorite: bool,
}

/// Query parameters for `GET /notes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteListParams {
    /// Only notes in this category.
    pub category_id: Option<DbId>,
    /// When `true`, only favorites.
    pub favorite: Option<bool>,
    /// Case-insensitive substring matched against title and content.
    pub q: Option<String>,
}
