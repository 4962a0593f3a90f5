//! Configuration management
//!
//! Precedence, lowest first: built-in defaults, TOML file, `BOOKSHELF_*`
//! environment variables. The binary applies CLI flags on top.

use crate::error::BookshelfResult;
use crate::logging::LoggingConfig;
use crate::{config_error, ErrorContext};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Secret used when nothing else is configured. Startup validation warns about it.
pub const DEV_JWT_SECRET: &str = "bookshelf-development-secret-change-me";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub password: PasswordConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which store implementation backs the services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// In-memory SQLite databases live and die with a single connection
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            issuer: "bookshelf".to_string(),
            token_ttl_secs: 48 * 3600,
        }
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BookshelfResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| crate::BookshelfError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("read_file"),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> BookshelfResult<Self> {
        toml::from_str(content).map_err(|e| crate::BookshelfError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("parse_toml"),
        })
    }

    /// Load from an explicit file, or from `bookshelf.toml` when it exists, then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> BookshelfResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new("bookshelf.toml").exists() => Self::from_file("bookshelf.toml")?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> BookshelfResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> BookshelfResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BOOKSHELF_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("BOOKSHELF_PORT") {
            self.server.port = parse_value("BOOKSHELF_PORT", &port)?;
        }
        if let Some(backend) = lookup("BOOKSHELF_DATABASE_BACKEND") {
            self.database.backend = match backend.to_lowercase().as_str() {
                "sqlite" => StorageBackend::Sqlite,
                "memory" => StorageBackend::Memory,
                other => {
                    return Err(config_error!(
                        format!("Unknown BOOKSHELF_DATABASE_BACKEND '{other}'"),
                        "config"
                    ))
                }
            };
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(issuer) = lookup("BOOKSHELF_JWT_ISSUER") {
            self.auth.issuer = issuer;
        }
        if let Some(ttl) = lookup("BOOKSHELF_TOKEN_TTL_SECS") {
            self.auth.token_ttl_secs = parse_value("BOOKSHELF_TOKEN_TTL_SECS", &ttl)?;
        }
        if let Some(level) = lookup("BOOKSHELF_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> BookshelfResult<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim().parse().map_err(|e| {
        config_error!(
            format!("Invalid value '{raw}' for {key}"),
            "config",
            e
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [auth]
            token_ttl_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.token_ttl_secs, 60);
        assert_eq!(config.auth.issuer, "bookshelf");
        assert_eq!(config.database.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nbackend = \"memory\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, crate::BookshelfError::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BOOKSHELF_PORT", "3000"),
            ("JWT_SECRET", "from-env"),
            ("DATABASE_URL", "sqlite://books.db"),
            ("BOOKSHELF_DATABASE_BACKEND", "Memory"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.database.url, "sqlite://books.db");
        assert_eq!(config.database.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_unparsable_override_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "BOOKSHELF_PORT").then(|| "eighty".to_string())
        });
        assert!(matches!(result, Err(crate::BookshelfError::Config { .. })));
    }

    #[test]
    fn test_in_memory_detection() {
        let mut database = DatabaseConfig::default();
        assert!(database.is_in_memory());
        database.url = "sqlite://data/books.db".to_string();
        assert!(!database.is_in_memory());
    }
}
