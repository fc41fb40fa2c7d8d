//! Borrows repository: the lending ledger storage operations
//!
//! Issue and return each run as a single transaction pairing the guarded
//! counter update on `books` with the borrow-row write, so the counter can
//! never drift from the set of issued rows.

use chrono::{DateTime, Duration, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookShort,
        borrow::{Borrow, BorrowDetails},
    },
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow record by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Borrow> {
        sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record {} not found", id)))
    }

    /// Issue one copy of a book to a user.
    ///
    /// The availability check is a compare-and-increment: the UPDATE only
    /// matches while a copy is free, and its row lock serializes concurrent
    /// issues of the same book. The borrow row is inserted in the same
    /// transaction.
    pub async fn issue(&self, user_id: i32, book_id: i32, period: Duration) -> AppResult<Borrow> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE books
            SET issued_quantity = issued_quantity + 1, updated_at = now()
            WHERE id = $1 AND issued_quantity < total_quantity
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                AppError::Unavailable(format!("No copies of book {} available", book_id))
            } else {
                AppError::NotFound(format!("Book {} not found", book_id))
            });
        }

        let now = Utc::now();
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (user_id, book_id, issued_at, due_at, status)
            VALUES ($1, $2, $3, $4, 'issued')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(now + period)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(borrow)
    }

    /// Return an issued copy.
    ///
    /// The status flip is guarded on the record still being issued, so a
    /// second return of the same record fails with InvalidState. The counter
    /// decrement is guarded against underflow; a non-matching decrement means
    /// the ledger and the counter have diverged, which is surfaced loudly and
    /// rolls the whole transaction back.
    pub async fn return_copy(&self, id: i32) -> AppResult<Borrow> {
        let mut tx = self.pool.begin().await?;

        let returned = sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows
            SET status = 'returned', returned_at = $2
            WHERE id = $1 AND status = 'issued'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let borrow = match returned {
            Some(borrow) => borrow,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrows WHERE id = $1)")
                        .bind(id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(if exists {
                    AppError::InvalidState(format!("Borrow record {} is already returned", id))
                } else {
                    AppError::NotFound(format!("Borrow record {} not found", id))
                });
            }
        };

        let decremented = sqlx::query(
            r#"
            UPDATE books
            SET issued_quantity = issued_quantity - 1, updated_at = now()
            WHERE id = $1 AND issued_quantity > 0
            "#,
        )
        .bind(borrow.book_id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            tracing::error!(
                "Ledger invariant violated: issued_quantity underflow for book {} on return of borrow {}",
                borrow.book_id,
                id
            );
            return Err(AppError::Internal(format!(
                "Issued count underflow for book {}",
                borrow.book_id
            )));
        }

        tx.commit().await?;
        Ok(borrow)
    }

    /// Details for one borrow record
    pub async fn details_by_id(&self, id: i32) -> AppResult<BorrowDetails> {
        let row = sqlx::query(&details_query("WHERE br.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record {} not found", id)))?;

        Ok(details_from_row(&row, Utc::now()))
    }

    /// Active borrows, optionally restricted to overdue ones
    pub async fn list_active(&self, overdue_only: bool) -> AppResult<Vec<BorrowDetails>> {
        let filter = if overdue_only {
            "WHERE br.status = 'issued' AND br.due_at < now()"
        } else {
            "WHERE br.status = 'issued'"
        };

        let rows = sqlx::query(&details_query(filter))
            .fetch_all(&self.pool)
            .await?;

        let now = Utc::now();
        Ok(rows.iter().map(|r| details_from_row(r, now)).collect())
    }

    /// Full borrow history of one user, newest first
    pub async fn history_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(&details_query("WHERE br.user_id = $1"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let now = Utc::now();
        Ok(rows.iter().map(|r| details_from_row(r, now)).collect())
    }

    /// Full borrow history of one book, newest first
    pub async fn history_for_book(&self, book_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(&details_query("WHERE br.book_id = $1"))
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;

        let now = Utc::now();
        Ok(rows.iter().map(|r| details_from_row(r, now)).collect())
    }

    /// Count all active borrows
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE status = 'issued'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count overdue borrows
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrows WHERE status = 'issued' AND due_at < now()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Active and overdue borrow counts for one user
    pub async fn counts_for_user(&self, user_id: i32) -> AppResult<(i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS active,
                   COUNT(*) FILTER (WHERE due_at < now()) AS overdue
            FROM borrows
            WHERE user_id = $1 AND status = 'issued'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get("active"), row.get("overdue")))
    }
}

fn details_query(filter: &str) -> String {
    format!(
        r#"
        SELECT br.id, br.issued_at, br.due_at, br.returned_at, br.status,
               b.id AS book_id, b.isbn, b.title, b.author,
               u.username, u.first_name, u.last_name
        FROM borrows br
        JOIN books b ON br.book_id = b.id
        JOIN users u ON br.user_id = u.id
        {}
        ORDER BY br.issued_at DESC
        "#,
        filter
    )
}

fn details_from_row(row: &PgRow, now: DateTime<Utc>) -> BorrowDetails {
    let status = row.get("status");
    let due_at: DateTime<Utc> = row.get("due_at");
    let first_name: String = row.get("first_name");
    let last_name: String = row.get("last_name");

    BorrowDetails {
        id: row.get("id"),
        book: BookShort {
            id: row.get("book_id"),
            isbn: row.get("isbn"),
            title: row.get("title"),
            author: row.get("author"),
        },
        issued_at: row.get("issued_at"),
        due_at,
        returned_at: row.get("returned_at"),
        status,
        is_overdue: status == crate::models::BorrowStatus::Issued && now > due_at,
        borrower_username: row.get("username"),
        borrower_name: format!("{} {}", first_name, last_name).trim().to_string(),
    }
}
