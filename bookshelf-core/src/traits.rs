//! Core trait definitions
//!
//! Store contracts the services depend on. Implementations must surface
//! infrastructure failures as `StoreUnavailable` and must not retry.

use crate::error::BookshelfResult;
use crate::types::*;
use async_trait::async_trait;

/// Persists user records with hashed passwords
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by exact email
    async fn find_by_email(&self, email: &str) -> BookshelfResult<Option<UserData>>;

    /// Look up a user by id
    async fn find_by_id(&self, id: UserId) -> BookshelfResult<Option<UserData>>;

    /// Whether a user with this email exists
    async fn exists_by_email(&self, email: &str) -> BookshelfResult<bool>;

    /// Insert a user. Fails with `DuplicateEmail` if the email is taken at insert
    /// time, whatever an earlier `exists_by_email` said.
    async fn insert(&self, user: NewUser) -> BookshelfResult<UserData>;

    /// Apply a partial update. `NotFound` if the user is gone, `DuplicateEmail`
    /// if the new email belongs to someone else.
    async fn update(&self, id: UserId, changes: UserChanges) -> BookshelfResult<UserData>;
}

/// Persists books with an owner reference
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch a book with its owner resolved
    async fn find_by_id(&self, id: BookId) -> BookshelfResult<Option<Book>>;

    /// All books, oldest first
    async fn find_all(&self) -> BookshelfResult<Vec<Book>>;

    async fn insert(&self, book: NewBook) -> BookshelfResult<Book>;

    /// Overwrite title and description. The owner is never written.
    async fn update(&self, book: &Book) -> BookshelfResult<Book>;

    async fn delete(&self, id: BookId) -> BookshelfResult<()>;
}
