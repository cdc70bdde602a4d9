//! Repository for the `tags` and `note_tags` tables.
//!
//! Provides owner-scoped tag CRUD, the name-keyed upsert used on creation,
//! and note-tag associations.

use marknotes_core::tags::DEFAULT_TAG_COLOR;
use marknotes_core::types::DbId;
use sqlx::PgPool;

use crate::models::tag::{NoteTag, Tag};

/// Column list for `tags` queries.
const TAG_COLUMNS: &str = "id, name, color, user_id, created_at";

/// Provides CRUD operations for tags and note-tag associations.
pub struct TagRepo;

impl TagRepo {
    // -----------------------------------------------------------------------
    // Tag CRUD
    // -----------------------------------------------------------------------

    /// List a user's tags ordered by name.
    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE user_id = $1 ORDER BY name");
        sqlx::query_as::<_, Tag>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find one of the user's tags by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create a tag or return the existing one with the same normalized name.
    ///
    /// `name` must already be normalized. Uses `ON CONFLICT` on
    /// `(user_id, name)`; the existing row's color is replaced only when a
    /// color is supplied.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
        color: Option<&str>,
    ) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (user_id, name, color) \
             VALUES ($1, $2, COALESCE($3, $4)) \
             ON CONFLICT (user_id, name) DO UPDATE SET color = COALESCE($3, tags.color) \
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(user_id)
            .bind(name)
            .bind(color)
            .bind(DEFAULT_TAG_COLOR)
            .fetch_one(pool)
            .await
    }

    /// Update a tag's name and/or color.
    ///
    /// Returns `None` if no row matches `(id, user_id)`. Renaming onto a name
    /// the user already has fails with a `uq_tags_user_name` violation.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!(
            "UPDATE tags SET \
                 name = COALESCE($3, name), \
                 color = COALESCE($4, color) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .bind(color)
            .fetch_optional(pool)
            .await
    }

    /// Delete a tag. Cascade deletes its note associations.
    ///
    /// Returns `true` if a tag was deleted.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Note-tag associations
    // -----------------------------------------------------------------------

    /// Attach a tag to a note. Idempotent: does nothing if already attached.
    ///
    /// Ownership of both rows must be checked by the caller. Returns `true`
    /// when a new association was created.
    pub async fn attach(pool: &PgPool, note_id: DbId, tag_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO note_tags (note_id, tag_id) \
             VALUES ($1, $2) \
             ON CONFLICT (note_id, tag_id) DO NOTHING",
        )
        .bind(note_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Detach a tag from a note. Returns `true` if an association was removed.
    pub async fn detach(pool: &PgPool, note_id: DbId, tag_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM note_tags WHERE note_id = $1 AND tag_id = $2")
            .bind(note_id)
            .bind(tag_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Tags attached to any of `note_ids`, restricted to the user's own tags.
    ///
    /// Ordered by note, then tag name.
    pub async fn list_for_notes(
        pool: &PgPool,
        user_id: DbId,
        note_ids: &[DbId],
    ) -> Result<Vec<NoteTag>, sqlx::Error> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, NoteTag>(
            "SELECT nt.note_id, t.id, t.name, t.color, t.user_id, t.created_at \
             FROM note_tags nt \
             JOIN tags t ON t.id = nt.tag_id \
             WHERE nt.note_id = ANY($1) AND t.user_id = $2 \
             ORDER BY nt.note_id, t.name",
        )
        .bind(note_ids)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Count association rows for a note regardless of owner.
    pub async fn count_for_note(pool: &PgPool, note_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM note_tags WHERE note_id = $1")
            .bind(note_id)
            .fetch_one(pool)
            .await
    }
}
