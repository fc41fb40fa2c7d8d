//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health, stats, sync, tags, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library Circulation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::popular_books,
        books::new_arrivals,
        books::get_book,
        books::book_borrow_history,
        books::create_book,
        books::update_book,
        books::set_capacity,
        books::delete_book,
        // Users
        users::list_users,
        users::get_user,
        users::user_borrow_history,
        users::create_staff,
        // Borrows
        borrows::issue_book,
        borrows::return_book,
        borrows::list_active,
        // Tags
        tags::list_tags,
        tags::create_tag,
        // Sync
        sync::run_sync,
        sync::sync_status,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Books
            crate::models::book::BookDetails,
            crate::models::book::BookShort,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::SetCapacityRequest,
            // Users
            crate::models::user::Role,
            crate::models::user::UserProfile,
            crate::models::user::CreateStaff,
            users::UserResponse,
            // Borrows
            crate::models::borrow::BorrowStatus,
            crate::models::borrow::BorrowDetails,
            crate::models::borrow::IssueBook,
            // Tags
            crate::models::tag::Tag,
            crate::models::tag::CreateTag,
            // Sync
            crate::services::sync::SyncStats,
            crate::services::scheduler::SyncRunReport,
            crate::services::scheduler::SyncStatus,
            // Stats
            crate::services::stats::DashboardStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "users", description = "Borrower and staff identities"),
        (name = "borrows", description = "Lending ledger"),
        (name = "tags", description = "Catalog tags"),
        (name = "sync", description = "Directory synchronization"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
