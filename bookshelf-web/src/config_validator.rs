//! Configuration validation for the Bookshelf web server
//!
//! Run once at startup, before any store is opened. Critical errors stop the
//! server; warnings are logged.

use crate::{WebError, WebResult};
use bookshelf_core::{AppConfig, StorageBackend, DEV_JWT_SECRET};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::{error, info, warn};

/// Shortest HS256 secret accepted without a warning, in bytes
const MIN_SECRET_LEN: usize = 32;

/// Configuration validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub severity: ErrorSeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Critical,
    High,
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the complete application configuration
    pub fn validate_config(config: &AppConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        Self::validate_network_config(config, &mut errors, &mut warnings);
        Self::validate_auth_config(config, &mut errors, &mut warnings);
        Self::validate_password_config(config, &mut errors);
        Self::validate_database_config(config, &mut errors, &mut warnings);

        let is_valid = errors
            .iter()
            .all(|e| e.severity != ErrorSeverity::Critical);

        ValidationResult {
            is_valid,
            errors,
            warnings,
        }
    }

    fn validate_network_config(
        config: &AppConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let server = &config.server;

        if server.host.is_empty() {
            errors.push(ValidationError {
                field: "server.host".to_string(),
                message: "Host cannot be empty".to_string(),
                severity: ErrorSeverity::Critical,
            });
        } else if server.host.parse::<IpAddr>().is_err() && server.host != "localhost" {
            errors.push(ValidationError {
                field: "server.host".to_string(),
                message: format!("Invalid host format: {}", server.host),
                severity: ErrorSeverity::High,
            });
        }

        if server.port == 0 {
            errors.push(ValidationError {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
                severity: ErrorSeverity::Critical,
            });
        } else if server.port < 1024 {
            warnings.push(ValidationWarning {
                field: "server.port".to_string(),
                message: format!("Using privileged port {}", server.port),
                recommendation: "Use a port >= 1024 unless running behind a proxy".to_string(),
            });
        }
    }

    fn validate_auth_config(
        config: &AppConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let auth = &config.auth;

        if auth.jwt_secret.is_empty() {
            errors.push(ValidationError {
                field: "auth.jwt_secret".to_string(),
                message: "JWT secret cannot be empty".to_string(),
                severity: ErrorSeverity::Critical,
            });
        } else if auth.jwt_secret == DEV_JWT_SECRET {
            warnings.push(ValidationWarning {
                field: "auth.jwt_secret".to_string(),
                message: "Using the built-in development secret".to_string(),
                recommendation: "Set JWT_SECRET to a random value".to_string(),
            });
        } else if auth.jwt_secret.len() < MIN_SECRET_LEN {
            warnings.push(ValidationWarning {
                field: "auth.jwt_secret".to_string(),
                message: format!("JWT secret is shorter than {MIN_SECRET_LEN} bytes"),
                recommendation: "Use a longer random secret".to_string(),
            });
        }

        if auth.issuer.is_empty() {
            errors.push(ValidationError {
                field: "auth.issuer".to_string(),
                message: "Token issuer cannot be empty".to_string(),
                severity: ErrorSeverity::High,
            });
        }

        if auth.token_ttl_secs == 0 {
            errors.push(ValidationError {
                field: "auth.token_ttl_secs".to_string(),
                message: "Token TTL must be positive".to_string(),
                severity: ErrorSeverity::Critical,
            });
        }
    }

    fn validate_password_config(config: &AppConfig, errors: &mut Vec<ValidationError>) {
        let password = &config.password;

        for (field, value) in [
            ("password.memory_kib", password.memory_kib),
            ("password.iterations", password.iterations),
            ("password.parallelism", password.parallelism),
        ] {
            if value == 0 {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: "Hasher cost parameter cannot be 0".to_string(),
                    severity: ErrorSeverity::Critical,
                });
            }
        }

        // argon2 needs at least 8 KiB per lane
        if password.parallelism > 0 && password.memory_kib < 8 * password.parallelism {
            errors.push(ValidationError {
                field: "password.memory_kib".to_string(),
                message: format!(
                    "memory_kib must be at least {} for parallelism {}",
                    8 * password.parallelism,
                    password.parallelism
                ),
                severity: ErrorSeverity::Critical,
            });
        }
    }

    fn validate_database_config(
        config: &AppConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let database = &config.database;

        match database.backend {
            StorageBackend::Memory => warnings.push(ValidationWarning {
                field: "database.backend".to_string(),
                message: "Using in-memory stores".to_string(),
                recommendation: "Use the sqlite backend to keep data across restarts".to_string(),
            }),
            StorageBackend::Sqlite => {
                if database.url.is_empty() {
                    errors.push(ValidationError {
                        field: "database.url".to_string(),
                        message: "Database URL cannot be empty".to_string(),
                        severity: ErrorSeverity::Critical,
                    });
                } else if !database.url.starts_with("sqlite:") {
                    errors.push(ValidationError {
                        field: "database.url".to_string(),
                        message: format!("Not a SQLite URL: {}", database.url),
                        severity: ErrorSeverity::Critical,
                    });
                } else if database.is_in_memory() {
                    warnings.push(ValidationWarning {
                        field: "database.url".to_string(),
                        message: "Using an in-memory SQLite database".to_string(),
                        recommendation: "Point DATABASE_URL at a file to keep data".to_string(),
                    });
                }

                if database.max_connections == 0 {
                    errors.push(ValidationError {
                        field: "database.max_connections".to_string(),
                        message: "max_connections cannot be 0".to_string(),
                        severity: ErrorSeverity::Critical,
                    });
                }
            }
        }
    }
}

impl ValidationResult {
    /// Log every finding at a level matching its severity
    pub fn log(&self) {
        if self.is_valid {
            info!("✅ Configuration validation passed");
        } else {
            error!("❌ Configuration validation failed");
        }

        for e in &self.errors {
            match e.severity {
                ErrorSeverity::Critical => error!("🚨 {}: {}", e.field, e.message),
                ErrorSeverity::High => warn!("❌ {}: {}", e.field, e.message),
            }
        }

        for w in &self.warnings {
            warn!(
                "⚠️  {}: {} (Recommendation: {})",
                w.field, w.message, w.recommendation
            );
        }
    }
}

/// Validate and log; fail if anything critical was found
pub fn validate_config(config: &AppConfig) -> WebResult<ValidationResult> {
    let result = ConfigValidator::validate_config(config);
    result.log();

    if !result.is_valid {
        return Err(WebError::Config(
            "Configuration validation failed".to_string(),
        ));
    }

    Ok(result)
}
