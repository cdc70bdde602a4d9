//! Handlers for the `/notes` resource.
//!
//! Notes are always returned with their category object (or `null`) and
//! their tags resolved.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use marknotes_core::error::CoreError;
use marknotes_core::notes::{title_or_default, validate_note_content, validate_note_title};
use marknotes_core::types::DbId;
use marknotes_db::models::note::{
    CreateNote, NewNote, NoteListParams, NoteWithRelations, SetFavorite, UpdateNote,
};
use marknotes_db::repositories::{CategoryRepo, NoteRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

fn note_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Note", id })
}

/// Reject a `category_id` that does not belong to the caller.
async fn ensure_category_owned(
    state: &AppState,
    category_id: DbId,
    user_id: DbId,
) -> AppResult<()> {
    if CategoryRepo::exists(&state.pool, category_id, user_id).await? {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Category {category_id} does not exist"
        )))
    }
}

/// Re-read a note with relations after a write.
async fn load_note(state: &AppState, note_id: DbId, user_id: DbId) -> AppResult<NoteWithRelations> {
    NoteRepo::find_by_id(&state.pool, note_id, user_id)
        .await?
        .ok_or_else(|| note_not_found(note_id))
}

/// GET /api/notes
///
/// Optional filters: `category_id`, `favorite`, `q`.
pub async fn list_notes(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<NoteListParams>,
) -> AppResult<Json<Vec<NoteWithRelations>>> {
    let notes = NoteRepo::list(&state.pool, auth.user_id, &params).await?;
    Ok(Json(notes))
}

/// GET /api/notes/{id}
pub async fn get_note(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(note_id): AppPath<DbId>,
) -> AppResult<Json<NoteWithRelations>> {
    Ok(Json(load_note(&state, note_id, auth.user_id).await?))
}

/// POST /api/notes
pub async fn create_note(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateNote>,
) -> AppResult<(StatusCode, Json<NoteWithRelations>)> {
    let title = title_or_default(input.title.as_deref()).map_err(AppError::validation)?;
    let content = input.content.unwrap_or_default();
    validate_note_content(&content).map_err(AppError::validation)?;

    if let Some(category_id) = input.category_id {
        ensure_category_owned(&state, category_id, auth.user_id).await?;
    }

    let new_note = NewNote {
        title,
        content,
        category_id: input.category_id,
        is_favorite: input.is_favorite.unwrap_or(false),
    };
    let note = NoteRepo::create(&state.pool, auth.user_id, &new_note).await?;

    tracing::info!(note_id = note.id, user_id = auth.user_id, "Note created");

    let created = load_note(&state, note.id, auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/notes/{id}
///
/// Only supplied fields change. `"category_id": null` clears the category.
pub async fn update_note(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(note_id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateNote>,
) -> AppResult<Json<NoteWithRelations>> {
    let title = match input.title.as_deref() {
        Some(t) => {
            validate_note_title(t).map_err(AppError::validation)?;
            Some(t.trim().to_string())
        }
        None => None,
    };
    if let Some(content) = input.content.as_deref() {
        validate_note_content(content).map_err(AppError::validation)?;
    }
    if let Some(Some(category_id)) = input.category_id {
        ensure_category_owned(&state, category_id, auth.user_id).await?;
    }

    let changes = UpdateNote { title, ..input };
    NoteRepo::update(&state.pool, note_id, auth.user_id, &changes)
        .await?
        .ok_or_else(|| note_not_found(note_id))?;

    tracing::info!(note_id, user_id = auth.user_id, "Note updated");

    Ok(Json(load_note(&state, note_id, auth.user_id).await?))
}

/// PATCH /api/notes/{id}/favorite
pub async fn set_favorite(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(note_id): AppPath<DbId>,
    AppJson(input): AppJson<SetFavorite>,
) -> AppResult<Json<NoteWithRelations>> {
    NoteRepo::set_favorite(&state.pool, note_id, auth.user_id, input.is_favorite)
        .await?
        .ok_or_else(|| note_not_found(note_id))?;

    tracing::info!(
        note_id,
        user_id = auth.user_id,
        is_favorite = input.is_favorite,
        "Note favorite toggled"
    );

    Ok(Json(load_note(&state, note_id, auth.user_id).await?))
}

/// DELETE /api/notes/{id}
pub async fn delete_note(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(note_id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !NoteRepo::delete(&state.pool, note_id, auth.user_id).await? {
        return Err(note_not_found(note_id));
    }

    tracing::info!(note_id, user_id = auth.user_id, "Note deleted");

    Ok(Json(MessageResponse::new("Note deleted successfully")))
}
