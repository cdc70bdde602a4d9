//! Repository for the `notes` table.
//!
//! Reads return [`NoteWithRelations`]: the note plus its category and tags,
//! both resolved with the same `user_id` filter as the note itself.

use std::collections::HashMap;

use marknotes_core::types::DbId;
use sqlx::PgPool;

use crate::models::note::{NewNote, Note, NoteListParams, NoteWithRelations, UpdateNote};
use crate::repositories::{CategoryRepo, TagRepo};

/// Column list for `notes` queries.
const COLUMNS: &str = "\
    id, title, content, category_id, user_id, is_favorite, \
    created_at, updated_at";

/// Provides owner-scoped CRUD operations for notes.
pub struct NoteRepo;

impl NoteRepo {
    /// List a user's notes, most recently updated first.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        params: &NoteListParams,
    ) -> Result<Vec<NoteWithRelations>, sqlx::Error> {
        let pattern = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", escape_like(q)));

        let query = format!(
            "SELECT {COLUMNS} FROM notes \
             WHERE user_id = $1 \
               AND ($2::BIGINT IS NULL OR category_id = $2) \
               AND ($3::BOOLEAN IS NULL OR is_favorite = $3) \
               AND ($4::TEXT IS NULL OR title ILIKE $4 OR content ILIKE $4) \
             ORDER BY updated_at DESC, id DESC"
        );
        let notes = sqlx::query_as::<_, Note>(&query)
            .bind(user_id)
            .bind(params.category_id)
            .bind(params.favorite)
            .bind(pattern)
            .fetch_all(pool)
            .await?;

        Self::with_relations(pool, user_id, notes).await
    }

    /// Find one of the user's notes by ID, with relations.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<NoteWithRelations>, sqlx::Error> {
        match Self::find_row(pool, id, user_id).await? {
            Some(note) => Ok(Self::with_relations(pool, user_id, vec![note])
                .await?
                .into_iter()
                .next()),
            None => Ok(None),
        }
    }

    /// Find the bare note row.
    pub async fn find_row(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Check whether the note exists and belongs to the user.
    pub async fn exists(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a note with defaults already resolved.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NewNote,
    ) -> Result<Note, sqlx::Error> {
        let query = format!(
            "INSERT INTO notes (user_id, title, content, category_id, is_favorite) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.category_id)
            .bind(input.is_favorite)
            .fetch_one(pool)
            .await
    }

    /// Update a note. Only provided fields change; `updated_at` always advances
    /// and never moves backwards.
    ///
    /// Returns `None` if no row matches `(id, user_id)`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateNote,
    ) -> Result<Option<Note>, sqlx::Error> {
        let category_provided = input.category_id.is_some();
        let category_value = input.category_id.flatten();

        let query = format!(
            "UPDATE notes SET \
                 title       = COALESCE($3, title), \
                 content     = COALESCE($4, content), \
                 category_id = CASE WHEN $5 THEN $6 ELSE category_id END, \
                 is_favorite = COALESCE($7, is_favorite), \
                 updated_at  = GREATEST(updated_at, NOW()) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(category_provided)
            .bind(category_value)
            .bind(input.is_favorite)
            .fetch_optional(pool)
            .await
    }

    /// Set only the favorite flag (and `updated_at`).
    pub async fn set_favorite(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        is_favorite: bool,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET \
                 is_favorite = $3, \
                 updated_at  = GREATEST(updated_at, NOW()) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .bind(is_favorite)
            .fetch_optional(pool)
            .await
    }

    /// Delete a note. Its `note_tags` rows are removed by cascade.
    ///
    /// Returns `true` if a note was deleted.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach categories and tags to a batch of notes, preserving order.
    pub async fn with_relations(
        pool: &PgPool,
        user_id: DbId,
        notes: Vec<Note>,
    ) -> Result<Vec<NoteWithRelations>, sqlx::Error> {
        let note_ids: Vec<DbId> = notes.iter().map(|n| n.id).collect();
        let mut category_ids: Vec<DbId> = notes.iter().filter_map(|n| n.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        let categories: HashMap<DbId, _> = CategoryRepo::find_many(pool, user_id, &category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut tags_by_note: HashMap<DbId, Vec<_>> = HashMap::new();
        for row in TagRepo::list_for_notes(pool, user_id, &note_ids).await? {
            tags_by_note.entry(row.note_id).or_default().push(row.tag);
        }

        Ok(notes
            .into_iter()
            .map(|note| NoteWithRelations {
                category: note.category_id.and_then(|id| categories.get(&id).cloned()),
                tags: tags_by_note.remove(&note.id).unwrap_or_default(),
                note,
            })
            .collect())
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
