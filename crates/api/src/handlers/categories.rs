//! Handlers for the `/categories` resource.
//!
//! Every query is scoped to the authenticated user; another user's category
//! is indistinguishable from a missing one.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use marknotes_core::categories::{
    normalize_category_name, validate_category_update, DEFAULT_CATEGORY_COLOR,
};
use marknotes_core::color::color_or_default;
use marknotes_core::error::CoreError;
use marknotes_core::types::DbId;
use marknotes_db::models::category::{Category, CreateCategory, UpdateCategory};
use marknotes_db::repositories::CategoryRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Response body for `DELETE /categories/{id}`.
#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    pub message: String,
    /// Number of notes whose category was cleared.
    pub uncategorized_notes: u64,
}

/// GET /api/categories
pub async fn list_categories(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryRepo::list(&state.pool, auth.user_id).await?;
    Ok(Json(categories))
}

/// POST /api/categories
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let name = normalize_category_name(&input.name).map_err(AppError::validation)?;
    let color = color_or_default(input.color.as_deref(), DEFAULT_CATEGORY_COLOR)
        .map_err(AppError::validation)?;

    let category = CategoryRepo::create(&state.pool, auth.user_id, &name, &color).await?;

    tracing::info!(
        category_id = category.id,
        user_id = auth.user_id,
        "Category created"
    );

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(category_id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCategory>,
) -> AppResult<Json<Category>> {
    let name = validate_category_update(input.name.as_deref(), input.color.as_deref())
        .map_err(AppError::validation)?;

    let category = CategoryRepo::update(
        &state.pool,
        category_id,
        auth.user_id,
        name.as_deref(),
        input.color.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Category",
        id: category_id,
    }))?;

    tracing::info!(category_id, user_id = auth.user_id, "Category updated");

    Ok(Json(category))
}

/// DELETE /api/categories/{id}
///
/// Notes in the category survive with their category cleared.
pub async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(category_id): AppPath<DbId>,
) -> AppResult<Json<DeleteCategoryResponse>> {
    let uncategorized_notes = CategoryRepo::delete(&state.pool, category_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    tracing::info!(
        category_id,
        user_id = auth.user_id,
        uncategorized_notes,
        "Category deleted"
    );

    Ok(Json(DeleteCategoryResponse {
        message: "Category deleted successfully".to_string(),
        uncategorized_notes,
    }))
}
