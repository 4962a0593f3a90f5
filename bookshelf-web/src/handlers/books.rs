//! Book endpoints. Every mutation goes through the ownership check.

use super::types::ApiResponse;
use crate::{auth::AuthUser, error::ApiResult, extract::ValidJson, AppState};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use bookshelf_core::{Book, BookDraft, BookId};

/// List all books
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "Books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = ApiResponse<Vec<Book>>),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<Book>>>> {
    let books = state.books.all().await?;
    Ok(Json(ApiResponse::ok("OK", books)))
}

/// Fetch one book
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "Books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = ApiResponse<Book>),
        (status = 400, description = "Id is not a number"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No book with this id")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<BookId>, PathRejection>,
) -> ApiResult<Json<ApiResponse<Book>>> {
    let Path(id) = id?;
    let book = state.books.find(id).await?;
    Ok(Json(ApiResponse::ok("OK", book)))
}

/// Create a book owned by the caller
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "Books",
    security(("bearer_auth" = [])),
    request_body = BookDraft,
    responses(
        (status = 201, description = "Book created", body = ApiResponse<Book>),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(draft): ValidJson<BookDraft>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let book = state.books.create(user.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("OK", book))))
}

/// Replace a book's title and description
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "Books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book id")),
    request_body = BookDraft,
    responses(
        (status = 200, description = "Book updated", body = ApiResponse<Book>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller does not own the book")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<BookId>, PathRejection>,
    ValidJson(draft): ValidJson<BookDraft>,
) -> ApiResult<Json<ApiResponse<Book>>> {
    let Path(id) = id?;
    let book = state.books.update(user.user_id, id, draft).await?;
    Ok(Json(ApiResponse::ok("OK", book)))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "Books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 400, description = "Id is not a number"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller does not own the book")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<BookId>, PathRejection>,
) -> ApiResult<Json<ApiResponse<BookId>>> {
    let Path(id) = id?;
    state.books.delete(user.user_id, id).await?;
    Ok(Json(ApiResponse::ok("Deleted", id)))
}
