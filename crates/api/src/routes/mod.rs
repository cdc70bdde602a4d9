pub mod auth;
pub mod categories;
pub mod health;
pub mod notes;
pub mod tags;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/me                           current user
/// /auth/logout                       revoke current session
///
/// /notes                             list, create
/// /notes/{id}                        get, update, delete
/// /notes/{id}/favorite               set favorite (PATCH)
///
/// /categories                        list, create
/// /categories/{id}                   update, delete
///
/// /tags                              list, create (upsert)
/// /tags/{id}                         update, delete
/// /tags/{id}/notes/{note_id}         attach (POST), detach (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/notes", notes::router())
        .nest("/categories", categories::router())
        .nest("/tags", tags::router())
}
