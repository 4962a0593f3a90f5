//! Database-backed resource store

use super::{parse_timestamp, store_failure};
use bookshelf_core::{
    async_trait, not_found_error, Book, BookId, BookshelfError, BookshelfResult, NewBook,
    ResourceStore, UserId, UserInfo,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

/// Books joined with their owner; owner columns are NULL when it no longer resolves
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.description, b.owner_id, b.created_at,
           u.id AS owner_user_id, u.name AS owner_name, u.email AS owner_email,
           u.created_at AS owner_created_at
    FROM books b
    LEFT JOIN users u ON u.id = b.owner_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct BookRecord {
    id: i64,
    title: String,
    description: String,
    owner_id: i64,
    created_at: String,
    owner_user_id: Option<i64>,
    owner_name: Option<String>,
    owner_email: Option<String>,
    owner_created_at: Option<String>,
}

impl BookRecord {
    fn into_book(self) -> BookshelfResult<Book> {
        let owner = match (
            self.owner_user_id,
            self.owner_name,
            self.owner_email,
            self.owner_created_at,
        ) {
            (Some(id), Some(name), Some(email), Some(created_at)) => Some(UserInfo {
                id: UserId(id),
                name,
                email,
                created_at: parse_timestamp(&created_at)?,
            }),
            _ => None,
        };

        Ok(Book {
            id: BookId(self.id),
            title: self.title,
            description: self.description,
            owner_id: UserId(self.owner_id),
            owner,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqliteResourceStore {
    pool: SqlitePool,
}

impl SqliteResourceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceStore for SqliteResourceStore {
    async fn find_by_id(&self, id: BookId) -> BookshelfResult<Option<Book>> {
        let record: Option<BookRecord> = sqlx::query_as(&format!("{BOOK_SELECT} WHERE b.id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_failure("find_book_by_id", e))?;

        record.map(BookRecord::into_book).transpose()
    }

    async fn find_all(&self) -> BookshelfResult<Vec<Book>> {
        let records: Vec<BookRecord> = sqlx::query_as(&format!("{BOOK_SELECT} ORDER BY b.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_failure("find_all_books", e))?;

        records.into_iter().map(BookRecord::into_book).collect()
    }

    async fn insert(&self, book: NewBook) -> BookshelfResult<Book> {
        let result = sqlx::query(
            "INSERT INTO books (title, description, owner_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(book.owner_id.0)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let dangling_owner = e
                .as_database_error()
                .map(|d| d.is_foreign_key_violation())
                .unwrap_or(false);
            if dangling_owner {
                not_found_error!(format!("user {}", book.owner_id))
            } else {
                store_failure("insert_book", e)
            }
        })?;

        let id = BookId(result.last_insert_rowid());
        debug!("Book inserted into database: {}", id);

        self.find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("book {id}")))
    }

    async fn update(&self, book: &Book) -> BookshelfResult<Book> {
        let result = sqlx::query("UPDATE books SET title = ?, description = ? WHERE id = ?")
            .bind(&book.title)
            .bind(&book.description)
            .bind(book.id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| store_failure("update_book", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error!(format!("book {}", book.id)));
        }

        self.find_by_id(book.id)
            .await?
            .ok_or_else(|| not_found_error!(format!("book {}", book.id)))
    }

    async fn delete(&self, id: BookId) -> BookshelfResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| store_failure("delete_book", e))?;

        if result.rows_affected() == 0 {
            return Err(BookshelfError::NotFound {
                resource: format!("book {id}"),
            });
        }
        Ok(())
    }
}
