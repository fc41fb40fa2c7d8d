//! Books repository for catalog database operations

use sqlx::{Pool, Postgres};
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        tag::Tag,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if an ISBN is already taken by another book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search books with free-text query, tag filter, availability filter
    /// and pagination. Free-text matches are bucketed by which field hit
    /// (title > author > isbn > description).
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let q = query.q.clone().unwrap_or_default();
        let pattern = format!("%{}%", q);
        let tag_ids = query.tag_ids();
        let available_only = query.available.unwrap_or(false);
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

        let filter = r#"
            ($1 = '' OR title ILIKE $2 OR author ILIKE $2 OR isbn ILIKE $2
                     OR description ILIKE $2)
            AND (cardinality($3::int[]) = 0 OR EXISTS (
                SELECT 1 FROM book_tags bt
                WHERE bt.book_id = books.id AND bt.tag_id = ANY($3)
            ))
            AND (NOT $4 OR issued_quantity < total_quantity)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM books WHERE {}",
            filter
        ))
        .bind(&q)
        .bind(&pattern)
        .bind(&tag_ids)
        .bind(available_only)
        .fetch_one(&self.pool)
        .await?;

        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT * FROM books
            WHERE {}
            ORDER BY CASE
                WHEN $1 = '' THEN 0
                WHEN title ILIKE $2 THEN 4
                WHEN author ILIKE $2 THEN 3
                WHEN isbn ILIKE $2 THEN 2
                ELSE 1
            END DESC, title ASC
            LIMIT $5 OFFSET $6
            "#,
            filter
        ))
        .bind(&q)
        .bind(&pattern)
        .bind(&tag_ids)
        .bind(available_only)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Most-borrowed books over the whole ledger history
    pub async fn popular(&self, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.* FROM books b
            JOIN (
                SELECT book_id, COUNT(*) AS borrow_count
                FROM borrows
                GROUP BY book_id
                ORDER BY borrow_count DESC
                LIMIT $1
            ) top ON top.book_id = b.id
            ORDER BY top.borrow_count DESC
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Latest additions to the catalog
    pub async fn new_arrivals(&self, limit: i64) -> AppResult<Vec<Book>> {
        let books =
            sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY created_at DESC LIMIT $1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;
        Ok(books)
    }

    /// Create a new book with its tag links
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, author, description, shelf, rack, total_quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&data.isbn)
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.description)
        .bind(&data.shelf)
        .bind(&data.rack)
        .bind(data.total_quantity)
        .fetch_one(&mut *tx)
        .await?;

        for tag_id in &data.tags {
            sqlx::query("INSERT INTO book_tags (book_id, tag_id) VALUES ($1, $2)")
                .bind(book.id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Update a book. The row is locked for the duration so the capacity
    /// guard (total can never drop below copies in circulation) holds under
    /// concurrent issues.
    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let total_quantity = match data.total_quantity {
            Some(n) if n < 0 => {
                return Err(AppError::Validation(
                    "Total quantity cannot be negative".to_string(),
                ))
            }
            Some(n) if n < current.issued_quantity => {
                return Err(AppError::Validation(format!(
                    "Total quantity {} cannot be less than currently issued quantity {}",
                    n, current.issued_quantity
                )))
            }
            Some(n) => n,
            None => current.total_quantity,
        };

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET isbn = $2, title = $3, author = $4, description = $5,
                shelf = $6, rack = $7, total_quantity = $8, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.isbn.as_ref().unwrap_or(&current.isbn))
        .bind(data.title.as_ref().unwrap_or(&current.title))
        .bind(data.author.as_ref().unwrap_or(&current.author))
        .bind(data.description.as_ref().or(current.description.as_ref()))
        .bind(data.shelf.as_ref().or(current.shelf.as_ref()))
        .bind(data.rack.as_ref().or(current.rack.as_ref()))
        .bind(total_quantity)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(tags) = &data.tags {
            sqlx::query("DELETE FROM book_tags WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for tag_id in tags {
                sqlx::query("INSERT INTO book_tags (book_id, tag_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(tag_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Set total copies, guarded against dropping below copies in circulation
    pub async fn set_total_quantity(&self, id: i32, new_total: i32) -> AppResult<Book> {
        if new_total < 0 {
            return Err(AppError::Validation(
                "Total quantity cannot be negative".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET total_quantity = $2, updated_at = now()
            WHERE id = $1 AND issued_quantity <= $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_total)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(book) => Ok(book),
            None => {
                let book = self.get_by_id(id).await?;
                Err(AppError::Validation(format!(
                    "Total quantity {} cannot be less than currently issued quantity {}",
                    new_total, book.issued_quantity
                )))
            }
        }
    }

    /// Delete a book and purge its borrow history. Refused while any copy
    /// is still in circulation.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let issued: i32 = sqlx::query_scalar(
            "SELECT issued_quantity FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if issued > 0 {
            return Err(AppError::HasIssuedCopies(format!(
                "Cannot delete book {}: {} copies still issued",
                id, issued
            )));
        }

        sqlx::query("DELETE FROM borrows WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Tags of one book
    pub async fn tags_for_book(&self, book_id: i32) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name FROM tags t
            JOIN book_tags bt ON bt.tag_id = t.id
            WHERE bt.book_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    /// Tags for a page of books, keyed by book id
    pub async fn tags_for_books(&self, book_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Tag>>> {
        let rows: Vec<(i32, i32, String)> = sqlx::query_as(
            r#"
            SELECT bt.book_id, t.id, t.name FROM tags t
            JOIN book_tags bt ON bt.tag_id = t.id
            WHERE bt.book_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(book_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<i32, Vec<Tag>> = HashMap::new();
        for (book_id, id, name) in rows {
            map.entry(book_id).or_default().push(Tag { id, name });
        }
        Ok(map)
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
