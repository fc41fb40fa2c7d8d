//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateStaff, User, UserProfile, UserQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List users with search and pagination
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.list(query).await
    }

    /// Profile of one user with current circulation counts
    pub async fn profile(&self, id: i32) -> AppResult<UserProfile> {
        let user = self.repository.users.get_by_id(id).await?;
        let (active, overdue) = self.repository.borrows.counts_for_user(id).await?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            active_borrows: active,
            overdue_borrows: overdue,
        })
    }

    /// Provision a staff identity
    pub async fn create_staff(&self, data: &CreateStaff) -> AppResult<User> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.users.create_staff(data).await
    }
}
