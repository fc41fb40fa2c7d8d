//! Data models for Libris

pub mod book;
pub mod borrow;
pub mod tag;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookShort};
pub use borrow::{Borrow, BorrowDetails, BorrowStatus};
pub use tag::Tag;
pub use user::{Role, User};
