//! Route definitions for the Bookshelf web server

use crate::{auth, handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Authentication
        .route("/auth/register", post(auth::handlers::register))
        .route("/auth/login", post(auth::handlers::login))
        // Profile of the token holder
        .route(
            "/user/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        // Books
        .route(
            "/books",
            get(handlers::list_books).post(handlers::create_book),
        )
        .route(
            "/books/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
}
