//! Tags repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::tag::Tag,
};

#[derive(Clone)]
pub struct TagsRepository {
    pool: Pool<Postgres>,
}

impl TagsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All tags, alphabetical
    pub async fn list(&self) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    /// Create a tag; names are unique case-insensitively
    pub async fn create(&self, name: &str) -> AppResult<Tag> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tags WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(AppError::Conflict(format!("Tag '{}' already exists", name)));
        }

        let tag = sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(tag)
    }

    /// Verify all ids refer to existing tags
    pub async fn all_exist(&self, ids: &[i32]) -> AppResult<bool> {
        if ids.is_empty() {
            return Ok(true);
        }
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(&self.pool)
            .await?;
        Ok(count == ids.len() as i64)
    }
}
