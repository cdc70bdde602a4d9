//! Route definitions for tags and note-tag associations.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// Routes mounted at `/tags`.
///
/// ```text
/// GET    /                            -> list_tags
/// POST   /                            -> create_tag
/// PUT    /{id}                        -> update_tag
/// DELETE /{id}                        -> delete_tag
/// POST   /{id}/notes/{note_id}        -> attach_tag
/// DELETE /{id}/notes/{note_id}        -> detach_tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::list_tags).post(tags::create_tag))
        .route("/{id}", put(tags::update_tag).delete(tags::delete_tag))
        .route(
            "/{id}/notes/{note_id}",
            post(tags::attach_tag).delete(tags::detach_tag),
        )
}
