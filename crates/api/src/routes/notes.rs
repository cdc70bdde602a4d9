use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::notes;
use crate::state::AppState;

/// Routes mounted at `/notes`.
///
/// ```text
/// GET    /                -> list_notes
/// POST   /                -> create_note
/// GET    /{id}            -> get_note
/// PUT    /{id}            -> update_note
/// DELETE /{id}            -> delete_note
/// PATCH  /{id}/favorite   -> set_favorite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list_notes).post(notes::create_note))
        .route(
            "/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/{id}/favorite", patch(notes::set_favorite))
}
