//! In-memory store implementations (for development and testing)

use crate::error::{BookshelfError, BookshelfResult};
use crate::traits::{CredentialStore, ResourceStore};
use crate::types::*;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, UserData>,
    users_by_email: HashMap<String, UserId>,
    next_id: i64,
}

/// Users kept in a map, with an email index enforcing uniqueness
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    table: Arc<RwLock<UserTable>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a user, leaving any books they own dangling
    #[cfg(test)]
    pub(crate) async fn remove(&self, id: UserId) {
        let mut table = self.table.write().await;
        if let Some(user) = table.users.remove(&id) {
            table.users_by_email.remove(&user.email);
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> BookshelfResult<Option<UserData>> {
        let table = self.table.read().await;
        Ok(table
            .users_by_email
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> BookshelfResult<Option<UserData>> {
        Ok(self.table.read().await.users.get(&id).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> BookshelfResult<bool> {
        Ok(self.table.read().await.users_by_email.contains_key(email))
    }

    async fn insert(&self, user: NewUser) -> BookshelfResult<UserData> {
        // Check and insert under one write lock, like a unique index would.
        let mut table = self.table.write().await;
        if table.users_by_email.contains_key(&user.email) {
            return Err(BookshelfError::DuplicateEmail);
        }

        table.next_id += 1;
        let user_data = UserData {
            id: UserId(table.next_id),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };

        table
            .users_by_email
            .insert(user_data.email.clone(), user_data.id);
        table.users.insert(user_data.id, user_data.clone());

        debug!("User inserted into memory store: {}", user_data.id);
        Ok(user_data)
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> BookshelfResult<UserData> {
        let mut table = self.table.write().await;
        let current = table
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| crate::not_found_error!(format!("user {id}")))?;

        let mut updated = current.clone();
        if let Some(email) = changes.email {
            if email != current.email {
                if table.users_by_email.contains_key(&email) {
                    return Err(BookshelfError::DuplicateEmail);
                }
                table.users_by_email.remove(&current.email);
                table.users_by_email.insert(email.clone(), id);
                updated.email = email;
            }
        }
        if let Some(name) = changes.name {
            updated.name = name;
        }
        if let Some(password_hash) = changes.password_hash {
            updated.password_hash = password_hash;
        }

        table.users.insert(id, updated.clone());
        Ok(updated)
    }
}

#[derive(Debug, Clone)]
struct BookRow {
    id: BookId,
    title: String,
    description: String,
    owner_id: UserId,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct BookTable {
    books: BTreeMap<BookId, BookRow>,
    next_id: i64,
}

/// Books kept in an ordered map; owners are resolved against a credential store
#[derive(Debug, Clone)]
pub struct MemoryResourceStore {
    table: Arc<RwLock<BookTable>>,
    users: MemoryCredentialStore,
}

impl MemoryResourceStore {
    pub fn new(users: MemoryCredentialStore) -> Self {
        Self {
            table: Arc::new(RwLock::new(BookTable::default())),
            users,
        }
    }

    async fn resolve(&self, row: BookRow) -> BookshelfResult<Book> {
        let owner = self
            .users
            .find_by_id(row.owner_id)
            .await?
            .map(|user| user.to_user_info());

        Ok(Book {
            id: row.id,
            title: row.title,
            description: row.description,
            owner_id: row.owner_id,
            owner,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn find_by_id(&self, id: BookId) -> BookshelfResult<Option<Book>> {
        let row = self.table.read().await.books.get(&id).cloned();
        match row {
            Some(row) => Ok(Some(self.resolve(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> BookshelfResult<Vec<Book>> {
        let rows: Vec<BookRow> = self.table.read().await.books.values().cloned().collect();
        let mut books = Vec::with_capacity(rows.len());
        for row in rows {
            books.push(self.resolve(row).await?);
        }
        Ok(books)
    }

    async fn insert(&self, book: NewBook) -> BookshelfResult<Book> {
        if self.users.find_by_id(book.owner_id).await?.is_none() {
            return Err(crate::not_found_error!(format!("user {}", book.owner_id)));
        }

        let row = {
            let mut table = self.table.write().await;
            table.next_id += 1;
            let row = BookRow {
                id: BookId(table.next_id),
                title: book.title,
                description: book.description,
                owner_id: book.owner_id,
                created_at: Utc::now(),
            };
            table.books.insert(row.id, row.clone());
            row
        };
        self.resolve(row).await
    }

    async fn update(&self, book: &Book) -> BookshelfResult<Book> {
        let row = {
            let mut table = self.table.write().await;
            let row = table
                .books
                .get_mut(&book.id)
                .ok_or_else(|| crate::not_found_error!(format!("book {}", book.id)))?;
            row.title = book.title.clone();
            row.description = book.description.clone();
            row.clone()
        };
        self.resolve(row).await
    }

    async fn delete(&self, id: BookId) -> BookshelfResult<()> {
        self.table
            .write()
            .await
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| crate::not_found_error!(format!("book {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryCredentialStore::new();
        let first = store.insert(new_user("a@x.com")).await.unwrap();
        let second = store.insert(new_user("b@x.com")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_insert_rejects_taken_email() {
        let store = MemoryCredentialStore::new();
        store.insert(new_user("a@x.com")).await.unwrap();
        let err = store.insert(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, BookshelfError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_update_moves_email_index() {
        let store = MemoryCredentialStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();

        let changes = UserChanges {
            email: Some("new@x.com".to_string()),
            ..Default::default()
        };
        store.update(user.id, changes).await.unwrap();

        assert!(!store.exists_by_email("a@x.com").await.unwrap());
        assert!(store.exists_by_email("new@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_book_update_keeps_owner() {
        let users = MemoryCredentialStore::new();
        let owner = users.insert(new_user("a@x.com")).await.unwrap();
        let books = MemoryResourceStore::new(users);

        let book = books
            .insert(NewBook {
                title: "Dune".to_string(),
                description: "Spice".to_string(),
                owner_id: owner.id,
            })
            .await
            .unwrap();

        let mut edited = book.clone();
        edited.title = "Dune Messiah".to_string();
        edited.owner_id = UserId(999);
        let updated = books.update(&edited).await.unwrap();

        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.owner_id, owner.id);
        assert_eq!(updated.owner.map(|o| o.id), Some(owner.id));
    }

    #[tokio::test]
    async fn test_book_with_unknown_owner_is_rejected() {
        let books = MemoryResourceStore::new(MemoryCredentialStore::new());
        let err = books
            .insert(NewBook {
                title: "Orphan".to_string(),
                description: "Nobody's".to_string(),
                owner_id: UserId(999),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BookshelfError::NotFound { .. }));
        assert!(books.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_book_is_not_found() {
        let books = MemoryResourceStore::new(MemoryCredentialStore::new());
        let err = books.delete(BookId(42)).await.unwrap_err();
        assert!(matches!(err, BookshelfError::NotFound { .. }));
    }
}
