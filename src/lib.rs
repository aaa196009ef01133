//! Harmoni - session-authenticated gateway for voice calls
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - SQLite pools and schema bootstrap
//! - [`account`] - Credential store (users)
//! - [`session`] - Server-side sessions and the signed session cookie
//! - [`user_auth`] - Signup, login, logout and the auth gate
//! - [`call_relay`] - Call provider token relay
//! - [`voice`] - Voice call session model driven by client events
//! - [`websocket`] - Broadcast relay between connected sockets
//! - [`gateway`] - HTTP router, shared state and OpenAPI document

// Ambient
pub mod config;
pub mod db;
pub mod logging;

// Auth core
pub mod account;
pub mod session;
pub mod user_auth;

// Calls
pub mod call_relay;
pub mod voice;

// HTTP surface
pub mod gateway;
pub mod websocket;

// Convenient re-exports at crate root
pub use account::{UserId, UserSnapshot};
pub use config::AppConfig;
pub use gateway::build_router;
pub use user_auth::{AuthError, UserAuthService};
