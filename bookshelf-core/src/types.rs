//! Core data structures shared by the services and the HTTP layer

use crate::error::{BookshelfError, BookshelfResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Store-assigned book identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct BookId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(UserId)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal user data with password hash
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserData {
    /// Convert to public user info
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public user information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserInfo {
    pub id: UserId,
    #[cfg_attr(feature = "openapi", schema(example = "Ada Lovelace"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "ada@example.com"))]
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A user about to be inserted; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update applied by the credential store
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// Book as returned by the resource store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Book {
    pub id: BookId,
    #[cfg_attr(feature = "openapi", schema(example = "The Rust Programming Language"))]
    pub title: String,
    pub description: String,
    pub owner_id: UserId,
    /// Resolved owner; `None` when the owner reference no longer resolves
    pub owner: Option<UserInfo>,
    pub created_at: DateTime<Utc>,
}

/// A book about to be inserted
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub owner_id: UserId,
}

/// Checks run at the boundary before a request reaches the services
pub trait Validate {
    fn validate(&self) -> BookshelfResult<()>;
}

/// User registration request
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterRequest {
    #[cfg_attr(feature = "openapi", schema(example = "Ada Lovelace"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "ada@example.com"))]
    pub email: String,
    #[cfg_attr(feature = "openapi", schema(example = "correct horse"))]
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    #[cfg_attr(feature = "openapi", schema(example = "ada@example.com"))]
    pub email: String,
    pub password: String,
}

/// Profile update request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Book create/update request. Has no owner field; the owner is always the caller.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookDraft {
    #[cfg_attr(feature = "openapi", schema(example = "The Rust Programming Language"))]
    pub title: String,
    pub description: String,
}

pub const MIN_PASSWORD_LEN: usize = 6;

fn require_non_empty(value: &str, field: &str) -> BookshelfResult<()> {
    if value.trim().is_empty() {
        return Err(BookshelfError::Validation {
            message: format!("{field} is required"),
            field: Some(field.to_string()),
        });
    }
    Ok(())
}

/// Canonical form an email is stored and looked up under
pub fn normalize_email(value: &str) -> String {
    value.trim().to_string()
}

fn require_email(value: &str) -> BookshelfResult<()> {
    require_non_empty(value, "email")?;

    let valid = match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(BookshelfError::Validation {
            message: "email must be a valid email address".to_string(),
            field: Some("email".to_string()),
        });
    }
    Ok(())
}

fn require_password(value: &str) -> BookshelfResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(BookshelfError::Validation {
            message: format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            field: Some("password".to_string()),
        });
    }
    Ok(())
}

impl Validate for RegisterRequest {
    fn validate(&self) -> BookshelfResult<()> {
        require_non_empty(&self.name, "name")?;
        require_email(&self.email)?;
        require_password(&self.password)
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> BookshelfResult<()> {
        require_email(&self.email)?;
        require_non_empty(&self.password, "password")
    }
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> BookshelfResult<()> {
        if self.name.is_none() && self.email.is_none() && self.password.is_none() {
            return Err(BookshelfError::Validation {
                message: "at least one of name, email or password is required".to_string(),
                field: None,
            });
        }
        if let Some(name) = &self.name {
            require_non_empty(name, "name")?;
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        if let Some(password) = &self.password {
            require_password(password)?;
        }
        Ok(())
    }
}

impl Validate for BookDraft {
    fn validate(&self) -> BookshelfResult<()> {
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.description, "description")
    }
}
