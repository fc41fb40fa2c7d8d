//! Libris Library Circulation Server
//!
//! A Rust backend for library circulation: catalog and borrower management,
//! a lending ledger with availability enforcement and due-date tracking, and
//! a periodic crawler that reconciles borrower identities from an external
//! directory.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
