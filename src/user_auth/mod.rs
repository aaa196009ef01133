//! User authentication: signup, login, logout and the session gate.
//!
//! - [`service`]: signup/login orchestration over the account and session stores
//! - [`password`]: Argon2id hashing off the async runtime
//! - [`gate`]: request classification from the session
//! - [`handlers`], [`middleware`]: the axum surface

pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod service;

pub use error::AuthError;
pub use gate::AuthStatus;
pub use password::{PasswordError, PasswordService};
pub use service::{LoginRequest, SignupRequest, UserAuthService};
