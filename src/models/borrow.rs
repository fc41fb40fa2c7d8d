//! Borrow (ledger entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookShort;

/// Lifecycle of a borrow record: `Issued` is the only live state,
/// `Returned` is terminal. Overdue is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "borrow_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Issued,
    Returned,
}

/// Borrow record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Borrow {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
}

impl Borrow {
    /// An issued record past its due date; a returned record is never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == BorrowStatus::Issued && now > self.due_at
    }
}

/// Borrow with book and borrower details for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowDetails {
    pub id: i32,
    pub book: BookShort,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub is_overdue: bool,
    pub borrower_username: String,
    pub borrower_name: String,
}

/// Issue request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IssueBook {
    pub book_id: i32,
    /// Borrower handle, as synced from the directory
    #[validate(length(min = 1))]
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn borrow(status: BorrowStatus, due_in_hours: i64) -> (Borrow, DateTime<Utc>) {
        let now = Utc::now();
        let record = Borrow {
            id: 1,
            user_id: 1,
            book_id: 1,
            issued_at: now - Duration::days(7),
            due_at: now + Duration::hours(due_in_hours),
            returned_at: None,
            status,
        };
        (record, now)
    }

    #[test]
    fn issued_past_due_is_overdue() {
        let (record, now) = borrow(BorrowStatus::Issued, -1);
        assert!(record.is_overdue(now));
    }

    #[test]
    fn issued_before_due_is_not_overdue() {
        let (record, now) = borrow(BorrowStatus::Issued, 1);
        assert!(!record.is_overdue(now));
    }

    #[test]
    fn returned_record_is_never_overdue() {
        let (record, now) = borrow(BorrowStatus::Returned, -48);
        assert!(!record.is_overdue(now));
    }

    #[test]
    fn due_date_boundary_is_not_overdue() {
        let (record, _) = borrow(BorrowStatus::Issued, 0);
        assert!(!record.is_overdue(record.due_at));
    }
}
