//! Book service with the ownership check in front of every mutation

use crate::error::{BookshelfError, BookshelfResult};
use crate::not_found_error;
use crate::traits::ResourceStore;
use crate::types::*;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct BookService {
    books: Arc<dyn ResourceStore>,
}

impl BookService {
    pub fn new(books: Arc<dyn ResourceStore>) -> Self {
        Self { books }
    }

    /// Whether `identity` owns `book_id`. A missing book or an owner that no
    /// longer resolves is a deny; store failures propagate.
    pub async fn is_allowed_to_edit(
        &self,
        identity: UserId,
        book_id: BookId,
    ) -> BookshelfResult<bool> {
        let Some(book) = self.books.find_by_id(book_id).await? else {
            return Ok(false);
        };

        match book.owner {
            Some(owner) => Ok(owner.id == identity),
            None => {
                warn!(book_id = %book_id, owner_id = %book.owner_id, "Book owner does not resolve");
                Ok(false)
            }
        }
    }

    pub async fn all(&self) -> BookshelfResult<Vec<Book>> {
        self.books.find_all().await
    }

    pub async fn find(&self, id: BookId) -> BookshelfResult<Book> {
        self.books
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("book {id}")))
    }

    /// The owner is always the caller
    pub async fn create(&self, identity: UserId, draft: BookDraft) -> BookshelfResult<Book> {
        let new_book = NewBook {
            title: draft.title,
            description: draft.description,
            owner_id: identity,
        };

        let book = self.books.insert(new_book).await?;
        info!(book_id = %book.id, owner_id = %identity, "Book created");
        Ok(book)
    }

    pub async fn update(
        &self,
        identity: UserId,
        id: BookId,
        draft: BookDraft,
    ) -> BookshelfResult<Book> {
        self.ensure_owner(identity, id).await?;

        let mut book = self.find(id).await?;
        book.title = draft.title;
        book.description = draft.description;

        let book = self.books.update(&book).await?;
        info!(book_id = %id, "Book updated");
        Ok(book)
    }

    pub async fn delete(&self, identity: UserId, id: BookId) -> BookshelfResult<()> {
        self.ensure_owner(identity, id).await?;

        self.books.delete(id).await?;
        info!(book_id = %id, "Book deleted");
        Ok(())
    }

    async fn ensure_owner(&self, identity: UserId, id: BookId) -> BookshelfResult<()> {
        if self.is_allowed_to_edit(identity, id).await? {
            Ok(())
        } else {
            warn!(user_id = %identity, book_id = %id, "Edit denied");
            Err(BookshelfError::NotOwner { book_id: id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::registration;
    use crate::memory::{MemoryCredentialStore, MemoryResourceStore};
    use crate::traits::CredentialStore;

    struct Fixture {
        users: MemoryCredentialStore,
        books: BookService,
    }

    fn fixture() -> Fixture {
        let users = MemoryCredentialStore::new();
        let store = MemoryResourceStore::new(users.clone());
        Fixture {
            users,
            books: BookService::new(Arc::new(store)),
        }
    }

    async fn user(users: &MemoryCredentialStore, email: &str) -> UserId {
        let request = registration(email);
        users
            .insert(NewUser {
                name: request.name,
                email: request.email,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn draft(title: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            description: "A book".to_string(),
        }
    }

    #[tokio::test]
    async fn test_only_the_owner_is_allowed() {
        let f = fixture();
        let ada = user(&f.users, "ada@x.com").await;
        let bob = user(&f.users, "bob@x.com").await;
        let book = f.books.create(ada, draft("Dune")).await.unwrap();

        assert_eq!(book.owner_id, ada);
        assert!(f.books.is_allowed_to_edit(ada, book.id).await.unwrap());
        assert!(!f.books.is_allowed_to_edit(bob, book.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_book_is_denied() {
        let f = fixture();
        let ada = user(&f.users, "ada@x.com").await;
        assert!(!f.books.is_allowed_to_edit(ada, BookId(404)).await.unwrap());
    }

    #[tokio::test]
    async fn test_dangling_owner_is_denied() {
        let f = fixture();
        let ada = user(&f.users, "ada@x.com").await;
        let book = f.books.create(ada, draft("Orphan")).await.unwrap();
        f.users.remove(ada).await;

        assert!(f.books.find(book.id).await.unwrap().owner.is_none());
        assert!(!f.books.is_allowed_to_edit(ada, book.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_owner_cannot_update_or_delete() {
        let f = fixture();
        let ada = user(&f.users, "ada@x.com").await;
        let bob = user(&f.users, "bob@x.com").await;
        let book = f.books.create(ada, draft("Dune")).await.unwrap();

        let err = f
            .books
            .update(bob, book.id, draft("Stolen"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookshelfError::NotOwner { book_id } if book_id == book.id));

        let err = f.books.delete(bob, book.id).await.unwrap_err();
        assert!(matches!(err, BookshelfError::NotOwner { .. }));

        assert_eq!(f.books.find(book.id).await.unwrap().title, "Dune");
    }

    #[tokio::test]
    async fn test_owner_can_update_then_delete() {
        let f = fixture();
        let ada = user(&f.users, "ada@x.com").await;
        let book = f.books.create(ada, draft("Dune")).await.unwrap();

        let updated = f
            .books
            .update(ada, book.id, draft("Dune Messiah"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.owner_id, ada);

        f.books.delete(ada, book.id).await.unwrap();
        let err = f.books.find(book.id).await.unwrap_err();
        assert!(matches!(err, BookshelfError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_of_missing_book_is_not_owner() {
        let f = fixture();
        let ada = user(&f.users, "ada@x.com").await;
        let err = f
            .books
            .update(ada, BookId(404), draft("Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookshelfError::NotOwner { .. }));
    }

    #[tokio::test]
    async fn test_all_lists_books_in_creation_order() {
        let f = fixture();
        let ada = user(&f.users, "ada@x.com").await;
        f.books.create(ada, draft("First")).await.unwrap();
        f.books.create(ada, draft("Second")).await.unwrap();

        let titles: Vec<String> = f
            .books
            .all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }
}
