//! Lending ledger service
//!
//! Owns the checkout lifecycle: availability-checked issue, single-use
//! return, and overdue reads. The atomic counter-plus-record writes live in
//! the borrows repository; this layer resolves the borrower and applies the
//! loan period.

use chrono::Duration;

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::borrow::{BorrowDetails, IssueBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
    loan_period: Duration,
}

impl LedgerService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self {
            repository,
            loan_period: Duration::days(config.period_days),
        }
    }

    /// Issue one copy of a book to a borrower
    pub async fn issue(&self, request: &IssueBook) -> AppResult<BorrowDetails> {
        let borrower = self
            .repository
            .users
            .get_borrower_by_username(&request.username)
            .await?;

        let borrow = self
            .repository
            .borrows
            .issue(borrower.id, request.book_id, self.loan_period)
            .await?;

        tracing::info!(
            "Issued book {} to {} (borrow {}, due {})",
            request.book_id,
            borrower.username,
            borrow.id,
            borrow.due_at
        );

        self.repository.borrows.details_by_id(borrow.id).await
    }

    /// Return a borrowed copy
    pub async fn return_copy(&self, borrow_id: i32) -> AppResult<BorrowDetails> {
        let borrow = self.repository.borrows.return_copy(borrow_id).await?;

        tracing::info!(
            "Returned borrow {} (book {}, user {})",
            borrow.id,
            borrow.book_id,
            borrow.user_id
        );

        self.repository.borrows.details_by_id(borrow.id).await
    }

    /// Active borrows, optionally restricted to overdue ones
    pub async fn list_active(&self, overdue_only: bool) -> AppResult<Vec<BorrowDetails>> {
        self.repository.borrows.list_active(overdue_only).await
    }

    /// Borrow history of one user
    pub async fn user_history(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        // Verify the user exists so an unknown id is a 404, not an empty list
        self.repository.users.get_by_id(user_id).await?;
        self.repository.borrows.history_for_user(user_id).await
    }

    /// Borrow history of one book
    pub async fn book_history(&self, book_id: i32) -> AppResult<Vec<BorrowDetails>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.borrows.history_for_book(book_id).await
    }
}
