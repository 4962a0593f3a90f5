//! Unified error handling system
//!
//! Expected outcomes (bad credential, bad token, duplicate email, non-owner) are
//! plain variants so callers can match on them. Infrastructure failures carry an
//! [`ErrorContext`] whose id shows up in the logs.

use crate::types::BookId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type BookshelfResult<T> = Result<T, BookshelfError>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }
}

/// Reasons a presented token is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    InvalidSignature,
}

/// Main error type for the Bookshelf system
#[derive(Error, Debug)]
pub enum BookshelfError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Unknown email and wrong password both end up here.
    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Not the owner of book {book_id}")]
    NotOwner { book_id: BookId },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Duplicate email")]
    DuplicateEmail,

    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl BookshelfError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            BookshelfError::StoreUnavailable { context, .. } => Some(context),
            BookshelfError::Config { context, .. } => Some(context),
            BookshelfError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            BookshelfError::StoreUnavailable { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Store call failed"
                );
            }
            BookshelfError::Config { .. } | BookshelfError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            _ => {
                tracing::debug!(error = %self, "Request rejected");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! store_error {
    ($msg:expr, $component:expr) => {
        $crate::BookshelfError::StoreUnavailable {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::BookshelfError::StoreUnavailable {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::BookshelfError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::BookshelfError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! internal_error {
    ($msg:expr, $component:expr) => {
        $crate::BookshelfError::Internal {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::BookshelfError::Internal {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::BookshelfError::Validation {
            message: $msg.to_string(),
            field: None,
        }
    };
    ($msg:expr, $field:expr) => {
        $crate::BookshelfError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr) => {
        $crate::BookshelfError::NotFound {
            resource: $resource.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_convert_into_bookshelf_errors() {
        let err: BookshelfError = TokenError::Expired.into();
        assert!(matches!(err, BookshelfError::Token(TokenError::Expired)));
        assert!(err.context().is_none());
    }

    #[test]
    fn store_errors_carry_context() {
        let err = store_error!("connection refused", "sqlite_store");
        let context = err.context().expect("store errors have context");
        assert_eq!(context.component, "sqlite_store");
        assert!(!context.error_id.is_empty());
    }

    #[test]
    fn invalid_credential_message_does_not_name_the_failing_part() {
        let message = BookshelfError::InvalidCredential.to_string();
        assert!(!message.to_lowercase().contains("password"));
        assert!(!message.to_lowercase().contains("email"));
    }
}
