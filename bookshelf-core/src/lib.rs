//! Bookshelf Core - identity, token and ownership primitives
//!
//! This crate holds everything the HTTP layer relies on to decide who a caller is
//! and what they may touch: domain types, the error taxonomy, configuration,
//! password hashing, signed tokens, the store contracts and the services built
//! on top of them.

pub mod auth;
pub mod books;
pub mod config;
pub mod error;
pub mod logging;
pub mod memory;
pub mod password;
pub mod profile;
pub mod token;
pub mod traits;
pub mod types;

pub use auth::*;
pub use books::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use memory::*;
pub use password::*;
pub use profile::*;
pub use token::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
