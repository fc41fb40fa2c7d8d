//! Catalog book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::tag::Tag;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub shelf: Option<String>,
    pub rack: Option<String>,
    pub total_quantity: i32,
    pub issued_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Copies on the shelf right now
    pub fn available_quantity(&self) -> i32 {
        self.total_quantity - self.issued_quantity
    }
}

/// Book with tags and derived availability for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub shelf: Option<String>,
    pub rack: Option<String>,
    pub total_quantity: i32,
    pub issued_quantity: i32,
    pub available_quantity: i32,
    pub tags: Vec<Tag>,
}

impl BookDetails {
    pub fn from_book(book: Book, tags: Vec<Tag>) -> Self {
        let available_quantity = book.available_quantity();
        Self {
            id: book.id,
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            description: book.description,
            shelf: book.shelf,
            rack: book.rack,
            total_quantity: book.total_quantity,
            issued_quantity: book.issued_quantity,
            available_quantity,
            tags,
        }
    }
}

/// Minimal book reference embedded in borrow responses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 13))]
    pub isbn: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<i32>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub total_quantity: i32,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub shelf: Option<String>,
    #[validate(length(max = 50))]
    pub rack: Option<String>,
}

/// Update book request (all fields optional)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 13))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub author: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub total_quantity: Option<i32>,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub shelf: Option<String>,
    #[validate(length(max = 50))]
    pub rack: Option<String>,
}

/// Book search query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Free-text search over title, author, isbn and description
    pub q: Option<String>,
    /// Comma-separated tag ids
    pub tags: Option<String>,
    /// Only books with at least one free copy
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl BookQuery {
    pub fn tag_ids(&self) -> Vec<i32> {
        self.tags
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(total: i32, issued: i32) -> Book {
        Book {
            id: 1,
            isbn: "9780000000001".into(),
            title: "Analysis I".into(),
            author: "T. Tao".into(),
            description: None,
            shelf: None,
            rack: None,
            total_quantity: total,
            issued_quantity: issued,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn available_quantity_is_total_minus_issued() {
        assert_eq!(book(5, 2).available_quantity(), 3);
        assert_eq!(book(3, 3).available_quantity(), 0);
    }

    #[test]
    fn tag_ids_parses_comma_separated_list() {
        let query = BookQuery {
            tags: Some("1,7, 12,junk".into()),
            ..Default::default()
        };
        assert_eq!(query.tag_ids(), vec![1, 7, 12]);

        let empty = BookQuery::default();
        assert!(empty.tag_ids().is_empty());
    }
}
