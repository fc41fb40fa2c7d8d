//! Catalog (books) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{BookDetails, BookQuery, CreateBook, UpdateBook},
    models::borrow::BorrowDetails,
    AppState,
};

use super::PaginatedResponse;

/// Capacity change request
#[derive(Deserialize, ToSchema)]
pub struct SetCapacityRequest {
    pub total_quantity: i32,
}

/// List books with search, tag filter and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<BookDetails>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookDetails>>> {
    let (books, total) = state.services.catalog.search(&query).await?;
    Ok(Json(PaginatedResponse::new(
        books,
        total,
        query.page,
        query.per_page,
    )))
}

/// Most-borrowed books
#[utoipa::path(
    get,
    path = "/books/popular",
    tag = "books",
    responses(
        (status = 200, description = "Most borrowed books", body = Vec<BookDetails>)
    )
)]
pub async fn popular_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookDetails>>> {
    Ok(Json(state.services.catalog.popular().await?))
}

/// Latest catalog additions
#[utoipa::path(
    get,
    path = "/books/new",
    tag = "books",
    responses(
        (status = 200, description = "Newest books", body = Vec<BookDetails>)
    )
)]
pub async fn new_arrivals(State(state): State<AppState>) -> AppResult<Json<Vec<BookDetails>>> {
    Ok(Json(state.services.catalog.new_arrivals().await?))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    Ok(Json(state.services.catalog.get_book(id).await?))
}

/// Borrow history of one book
#[utoipa::path(
    get,
    path = "/books/{id}/borrows",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Borrow history", body = Vec<BorrowDetails>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_borrow_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    Ok(Json(state.services.ledger.book_history(id).await?))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    let book = state.services.catalog.create_book(&data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 400, description = "Capacity below issued copies"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<BookDetails>> {
    Ok(Json(state.services.catalog.update_book(id, &data).await?))
}

/// Set the number of physical copies of a book
#[utoipa::path(
    put,
    path = "/books/{id}/capacity",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = SetCapacityRequest,
    responses(
        (status = 200, description = "Capacity updated", body = BookDetails),
        (status = 400, description = "Capacity below issued copies"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn set_capacity(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<SetCapacityRequest>,
) -> AppResult<Json<BookDetails>> {
    Ok(Json(
        state
            .services
            .catalog
            .set_capacity(id, data.total_quantity)
            .await?,
    ))
}

/// Delete a book and its borrow history
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies still issued")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
