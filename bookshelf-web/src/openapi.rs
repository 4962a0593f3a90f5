//! OpenAPI document for the Bookshelf API

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::HealthResponse;
use bookshelf_core::{
    AuthSession, Book, BookDraft, BookId, IssuedToken, LoginRequest, ProfileUpdate,
    RegisterRequest, UserId, UserInfo,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Accounts, profiles and owner-guarded books"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,

        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::handlers::get_profile,
        crate::handlers::update_profile,

        crate::handlers::list_books,
        crate::handlers::get_book,
        crate::handlers::create_book,
        crate::handlers::update_book,
        crate::handlers::delete_book,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            AuthSession,
            IssuedToken,
            UserInfo,
            UserId,
            ProfileUpdate,
            Book,
            BookId,
            BookDraft,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration and login"),
        (name = "User", description = "Profile of the authenticated user"),
        (name = "Books", description = "Books; only the owner may change one"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the bearer token scheme
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/health",
            "/api/auth/register",
            "/api/auth/login",
            "/api/user/profile",
            "/api/books",
            "/api/books/{id}",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
