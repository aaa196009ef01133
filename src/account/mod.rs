//! Account management module
//!
//! SQLite-backed credential store for users.

pub mod models;
pub mod repository;
pub mod validation;

// Re-export commonly used types
pub use models::{NewUser, User, UserId, UserSnapshot};
pub use repository::{RepositoryError, UserRepository};
pub use validation::ValidationError;

// Re-export Database from top-level db module
pub use crate::db::Database;
