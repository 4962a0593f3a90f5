//! Application state shared by every handler

use crate::database::{self, SqliteCredentialStore, SqliteResourceStore};
use crate::WebResult;
use bookshelf_core::{
    AppConfig, AuthService, BookService, CredentialStore, MemoryCredentialStore,
    MemoryResourceStore, PasswordHasher, ProfileService, ResourceStore, StorageBackend,
    TokenService,
};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub profiles: ProfileService,
    pub books: BookService,
}

impl AppState {
    /// Build the services on top of the configured storage backend
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        let (users, books): (Arc<dyn CredentialStore>, Arc<dyn ResourceStore>) =
            match config.database.backend {
                StorageBackend::Sqlite => {
                    let pool = database::connect(&config.database).await?;
                    (
                        Arc::new(SqliteCredentialStore::new(pool.clone())),
                        Arc::new(SqliteResourceStore::new(pool)),
                    )
                }
                StorageBackend::Memory => {
                    info!("Using in-memory stores; data is lost on restart");
                    let users = MemoryCredentialStore::new();
                    (
                        Arc::new(users.clone()),
                        Arc::new(MemoryResourceStore::new(users)),
                    )
                }
            };

        Self::with_stores(config, users, books)
    }

    pub fn with_stores(
        config: AppConfig,
        users: Arc<dyn CredentialStore>,
        books: Arc<dyn ResourceStore>,
    ) -> WebResult<Self> {
        let hasher = PasswordHasher::new(&config.password)?;
        let tokens = TokenService::new(&config.auth)?;

        Ok(Self {
            auth: AuthService::new(users.clone(), hasher.clone(), tokens),
            profiles: ProfileService::new(users, hasher),
            books: BookService::new(books),
            config: Arc::new(config),
        })
    }

    pub fn tokens(&self) -> &TokenService {
        self.auth.tokens()
    }
}

/// Configuration with cheap hashing and in-memory SQLite
#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test-secret-that-is-long-enough-for-hs256".to_string();
    config.password.memory_kib = 64;
    config.password.iterations = 1;
    config.password.parallelism = 1;
    config
}

#[cfg(test)]
pub(crate) async fn test_state() -> AppState {
    AppState::new(test_config()).await.unwrap()
}
