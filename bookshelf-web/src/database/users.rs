//! Database-backed credential store

use super::{is_unique_violation, parse_timestamp, store_failure};
use bookshelf_core::{
    async_trait, not_found_error, BookshelfError, BookshelfResult, CredentialStore, NewUser,
    UserChanges, UserData, UserId,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

/// Database user record
#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    created_at: String, // RFC 3339
}

impl UserRecord {
    fn into_user_data(self) -> BookshelfResult<UserData> {
        Ok(UserData {
            id: UserId(self.id),
            created_at: parse_timestamp(&self.created_at)?,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: UserId) -> BookshelfResult<Option<UserData>> {
        let record: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| store_failure("find_user_by_id", e))?;

        record.map(UserRecord::into_user_data).transpose()
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_by_email(&self, email: &str) -> BookshelfResult<Option<UserData>> {
        let record: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| store_failure("find_user_by_email", e))?;

        record.map(UserRecord::into_user_data).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> BookshelfResult<Option<UserData>> {
        self.fetch(id).await
    }

    async fn exists_by_email(&self, email: &str) -> BookshelfResult<bool> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_failure("user_exists_by_email", e))?;

        Ok(count > 0)
    }

    async fn insert(&self, user: NewUser) -> BookshelfResult<UserData> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("Insert rejected by unique email constraint");
                BookshelfError::DuplicateEmail
            } else {
                store_failure("insert_user", e)
            }
        })?;

        let id = UserId(result.last_insert_rowid());
        debug!("User inserted into database: {}", id);

        Ok(UserData {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at,
        })
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> BookshelfResult<UserData> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            "#,
        )
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BookshelfError::DuplicateEmail
            } else {
                store_failure("update_user", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found_error!(format!("user {id}")));
        }

        self.fetch(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("user {id}")))
    }
}
