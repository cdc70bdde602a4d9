//! Repository for the `categories` table.

use marknotes_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::Category;

/// Column list for `categories` queries.
const COLUMNS: &str = "id, name, color, user_id, created_at";

/// Provides owner-scoped CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List a user's categories ordered by name.
    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories WHERE user_id = $1 ORDER BY name, id"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find one of the user's categories by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the subset of `ids` that belong to the user.
    pub async fn find_many(
        pool: &PgPool,
        user_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Category>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM categories WHERE user_id = $1 AND id = ANY($2)"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(user_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Check whether the category exists and belongs to the user.
    pub async fn exists(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a category. `name` must already be trimmed and `color` resolved.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
        color: &str,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (user_id, name, color) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(user_id)
            .bind(name)
            .bind(color)
            .fetch_one(pool)
            .await
    }

    /// Update a category's name and/or color.
    ///
    /// Returns `None` if no row matches `(id, user_id)`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET \
                 name = COALESCE($3, name), \
                 color = COALESCE($4, color) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .bind(color)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category, leaving its notes uncategorized.
    ///
    /// Returns `None` if no row matches `(id, user_id)`, otherwise the number
    /// of notes whose `category_id` was cleared.
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let cleared = sqlx::query(
            "UPDATE notes SET category_id = NULL \
             WHERE category_id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(cleared))
    }
}
