//! API handlers for Libris REST endpoints

pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;
pub mod stats;
pub mod sync;
pub mod tags;
pub mod users;

use serde::Serialize;
use utoipa::ToSchema;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of results
    pub results: Vec<T>,
    /// Total number of matching records
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Records per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(results: Vec<T>, total: i64, page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            results,
            total,
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(10).clamp(1, 100),
        }
    }
}
