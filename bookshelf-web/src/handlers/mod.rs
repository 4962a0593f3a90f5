//! HTTP request handlers for the Bookshelf web server

pub mod books;
pub mod health;
pub mod types;
pub mod users;

pub use books::*;
pub use health::*;
pub use users::*;

pub use types::*;
