//! Circulation statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::user::Role, repository::Repository};

/// Staff dashboard counters
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_books: i64,
    pub total_borrowers: i64,
    pub active_borrows: i64,
    pub overdue_borrows: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Database connectivity probe for the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        Ok(DashboardStats {
            total_books: self.repository.books.count().await?,
            total_borrowers: self.repository.users.count_by_role(Role::Borrower).await?,
            active_borrows: self.repository.borrows.count_active().await?,
            overdue_borrows: self.repository.borrows.count_overdue().await?,
        })
    }
}
