//! Mapping from core errors to HTTP responses

use crate::handlers::types::ApiResponse;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_core::{BookshelfError, TokenError};

/// Error returned by handlers and extractors, rendered as the failure envelope
#[derive(Debug)]
pub struct ApiError(pub BookshelfError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookshelfError::Validation { .. } => StatusCode::BAD_REQUEST,
            BookshelfError::InvalidCredential | BookshelfError::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            BookshelfError::NotOwner { .. } => StatusCode::FORBIDDEN,
            BookshelfError::NotFound { .. } => StatusCode::NOT_FOUND,
            BookshelfError::DuplicateEmail => StatusCode::CONFLICT,
            BookshelfError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            BookshelfError::Config { .. } | BookshelfError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message_and_errors(&self) -> (&'static str, Vec<String>) {
        match &self.0 {
            BookshelfError::Validation { message, .. } => {
                ("Failed to process request", vec![message.clone()])
            }
            BookshelfError::InvalidCredential => (
                "Please check again your credential",
                vec!["Invalid credential".to_string()],
            ),
            BookshelfError::Token(e) => ("Unauthorized", vec![e.to_string()]),
            BookshelfError::NotOwner { .. } => (
                "You don't have permission",
                vec!["You are not the owner".to_string()],
            ),
            BookshelfError::NotFound { resource } => {
                ("Data not found", vec![format!("No {resource}")])
            }
            BookshelfError::DuplicateEmail => (
                "Failed to process request",
                vec!["Duplicate email".to_string()],
            ),
            // Infrastructure details stay in the logs; the id links the two
            other => {
                let reference = other
                    .context()
                    .map(|c| format!("error id {}", c.error_id))
                    .into_iter()
                    .collect();
                match other {
                    BookshelfError::StoreUnavailable { .. } => {
                        ("Service temporarily unavailable", reference)
                    }
                    _ => ("Internal server error", reference),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();

        let status = self.status();
        let (message, errors) = self.message_and_errors();
        let body = ApiResponse::<()>::failure(message, errors);

        (status, Json(body)).into_response()
    }
}

impl From<BookshelfError> for ApiError {
    fn from(err: BookshelfError) -> Self {
        Self(err)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(bookshelf_core::validation_error!(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(bookshelf_core::validation_error!(rejection.body_text(), "id"))
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::{store_error, BookId};
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (bookshelf_core::validation_error!("bad"), StatusCode::BAD_REQUEST),
            (BookshelfError::InvalidCredential, StatusCode::UNAUTHORIZED),
            (TokenError::Expired.into(), StatusCode::UNAUTHORIZED),
            (
                BookshelfError::NotOwner { book_id: BookId(1) },
                StatusCode::FORBIDDEN,
            ),
            (bookshelf_core::not_found_error!("book 1"), StatusCode::NOT_FOUND),
            (BookshelfError::DuplicateEmail, StatusCode::CONFLICT),
            (store_error!("down", "test"), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_failure_envelope() {
        let response = ApiError(BookshelfError::NotOwner { book_id: BookId(3) }).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"][0], "You are not the owner");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_store_failure_hides_details() {
        let response = ApiError(store_error!("disk I/O error at /var/db", "sqlite")).into_response();
        let body = body_json(response).await;

        let rendered = body.to_string();
        assert!(!rendered.contains("/var/db"));
        assert!(body["errors"][0].as_str().unwrap().starts_with("error id "));
    }
}
