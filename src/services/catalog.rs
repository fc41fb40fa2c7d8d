//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, BookQuery, CreateBook, UpdateBook},
    models::tag::Tag,
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with tags attached
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let (books, total) = self.repository.books.search(query).await?;
        Ok((self.with_tags(books).await?, total))
    }

    /// Most-borrowed books
    pub async fn popular(&self) -> AppResult<Vec<BookDetails>> {
        let books = self.repository.books.popular(6).await?;
        self.with_tags(books).await
    }

    /// Latest additions to the catalog
    pub async fn new_arrivals(&self) -> AppResult<Vec<BookDetails>> {
        let books = self.repository.books.new_arrivals(10).await?;
        self.with_tags(books).await
    }

    /// Get book details by ID
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let tags = self.repository.books.tags_for_book(id).await?;
        Ok(BookDetails::from_book(book, tags))
    }

    /// Create a book after validating ISBN uniqueness and tag references
    pub async fn create_book(&self, data: &CreateBook) -> AppResult<BookDetails> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.isbn_exists(&data.isbn, None).await? {
            return Err(AppError::Conflict(format!(
                "A book with ISBN {} already exists",
                data.isbn
            )));
        }
        if !self.repository.tags.all_exist(&data.tags).await? {
            return Err(AppError::Validation("Unknown tag id".to_string()));
        }

        let book = self.repository.books.create(data).await?;
        self.get_book(book.id).await
    }

    /// Update a book; capacity can never drop below copies in circulation
    pub async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<BookDetails> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref isbn) = data.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "A book with ISBN {} already exists",
                    isbn
                )));
            }
        }
        if let Some(ref tags) = data.tags {
            if !self.repository.tags.all_exist(tags).await? {
                return Err(AppError::Validation("Unknown tag id".to_string()));
            }
        }

        self.repository.books.update(id, data).await?;
        self.get_book(id).await
    }

    /// Set the number of physical copies
    pub async fn set_capacity(&self, id: i32, new_total: i32) -> AppResult<BookDetails> {
        self.repository.books.set_total_quantity(id, new_total).await?;
        self.get_book(id).await
    }

    /// Delete a book; refused while copies are issued
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// All tags, alphabetical
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        self.repository.tags.list().await
    }

    /// Create a tag (unique case-insensitively)
    pub async fn create_tag(&self, name: &str) -> AppResult<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Tag name cannot be empty".to_string()));
        }
        self.repository.tags.create(name).await
    }

    async fn with_tags(&self, books: Vec<Book>) -> AppResult<Vec<BookDetails>> {
        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
        let mut tag_map = self.repository.books.tags_for_books(&ids).await?;
        Ok(books
            .into_iter()
            .map(|b| {
                let tags = tag_map.remove(&b.id).unwrap_or_default();
                BookDetails::from_book(b, tags)
            })
            .collect())
    }
}
