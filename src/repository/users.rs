//! Users repository for identity database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateStaff, Role, User, UserQuery},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username, if present
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Get a borrower by username; a staff account under that handle does
    /// not qualify for checkouts
    pub async fn get_borrower_by_username(&self, username: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1) AND role = 'borrower'",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::UserNotFound(format!("Borrower '{}' not found", username)))
    }

    /// List users with search and pagination
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let q = query.q.clone().unwrap_or_default();
        let pattern = format!("%{}%", q);
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

        let filter = r#"
            ($1 = '' OR username ILIKE $2 OR first_name ILIKE $2 OR last_name ILIKE $2)
            AND ($3::user_role IS NULL OR role = $3)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM users WHERE {}",
            filter
        ))
        .bind(&q)
        .bind(&pattern)
        .bind(query.role)
        .fetch_one(&self.pool)
        .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users WHERE {} ORDER BY username LIMIT $4 OFFSET $5",
            filter
        ))
        .bind(&q)
        .bind(&pattern)
        .bind(query.role)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok((users, total))
    }

    /// Create a borrower identity with no usable credential
    pub async fn create_borrower(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, first_name, last_name, email, role)
            VALUES ($1, $2, $3, $4, 'borrower')
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Provision a staff identity
    pub async fn create_staff(&self, data: &CreateStaff) -> AppResult<User> {
        if self.get_by_username(&data.username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, first_name, last_name, email, role)
            VALUES ($1, $2, $3, $4, 'staff')
            RETURNING *
            "#,
        )
        .bind(&data.username)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Overwrite the display name of an existing identity
    pub async fn update_name(&self, id: i32, first_name: &str, last_name: &str) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE users SET first_name = $2, last_name = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::UserNotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Count users with the given role
    pub async fn count_by_role(&self, role: Role) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
