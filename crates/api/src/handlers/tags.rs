//! Handlers for the `/tags` resource and note-tag associations.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use marknotes_core::error::CoreError;
use marknotes_core::tags::{validate_tag_color, validate_tag_name};
use marknotes_core::types::DbId;
use marknotes_db::models::tag::{CreateTag, Tag, UpdateTag};
use marknotes_db::repositories::{NoteRepo, TagRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

fn tag_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Tag", id })
}

fn note_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Note", id })
}

// ---------------------------------------------------------------------------
// Tag CRUD
// ---------------------------------------------------------------------------

/// GET /api/tags
pub async fn list_tags(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Tag>>> {
    let tags = TagRepo::list(&state.pool, auth.user_id).await?;
    Ok(Json(tags))
}

/// POST /api/tags
///
/// Upsert by normalized name: creating an existing name returns that tag.
pub async fn create_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTag>,
) -> AppResult<(StatusCode, Json<Tag>)> {
    let name = validate_tag_name(&input.name).map_err(AppError::validation)?;
    validate_tag_color(input.color.as_deref()).map_err(AppError::validation)?;

    let tag = TagRepo::upsert(&state.pool, auth.user_id, &name, input.color.as_deref()).await?;

    tracing::info!(tag_id = tag.id, user_id = auth.user_id, name = %tag.name, "Tag upserted");

    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/tags/{id}
///
/// Renaming onto another of the user's tag names yields 409.
pub async fn update_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(tag_id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTag>,
) -> AppResult<Json<Tag>> {
    let name = input
        .name
        .as_deref()
        .map(validate_tag_name)
        .transpose()
        .map_err(AppError::validation)?;
    validate_tag_color(input.color.as_deref()).map_err(AppError::validation)?;

    let tag = TagRepo::update(
        &state.pool,
        tag_id,
        auth.user_id,
        name.as_deref(),
        input.color.as_deref(),
    )
    .await?
    .ok_or_else(|| tag_not_found(tag_id))?;

    tracing::info!(tag_id, user_id = auth.user_id, "Tag updated");

    Ok(Json(tag))
}

/// DELETE /api/tags/{id}
///
/// Removes the tag from every note it was attached to.
pub async fn delete_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(tag_id): AppPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !TagRepo::delete(&state.pool, tag_id, auth.user_id).await? {
        return Err(tag_not_found(tag_id));
    }

    tracing::info!(tag_id, user_id = auth.user_id, "Tag deleted");

    Ok(Json(MessageResponse::new("Tag deleted successfully")))
}

// ---------------------------------------------------------------------------
// Note-tag associations
// ---------------------------------------------------------------------------

/// POST /api/tags/{tag_id}/notes/{note_id}
///
/// Note ownership is checked before tag ownership. Attaching twice is a no-op.
pub async fn attach_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((tag_id, note_id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<MessageResponse>> {
    if !NoteRepo::exists(&state.pool, note_id, auth.user_id).await? {
        return Err(note_not_found(note_id));
    }
    if TagRepo::find_by_id(&state.pool, tag_id, auth.user_id)
        .await?
        .is_none()
    {
        return Err(tag_not_found(tag_id));
    }

    let inserted = TagRepo::attach(&state.pool, note_id, tag_id).await?;

    tracing::info!(
        tag_id,
        note_id,
        user_id = auth.user_id,
        inserted,
        "Tag attached to note"
    );

    Ok(Json(MessageResponse::new("Tag added to note successfully")))
}

/// DELETE /api/tags/{tag_id}/notes/{note_id}
///
/// Detaching a tag that is not attached still succeeds.
pub async fn detach_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((tag_id, note_id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<MessageResponse>> {
    if !NoteRepo::exists(&state.pool, note_id, auth.user_id).await? {
        return Err(note_not_found(note_id));
    }

    let removed = TagRepo::detach(&state.pool, note_id, tag_id).await?;

    tracing::info!(
        tag_id,
        note_id,
        user_id = auth.user_id,
        removed,
        "Tag detached from note"
    );

    Ok(Json(MessageResponse::new("Tag removed from note successfully")))
}
