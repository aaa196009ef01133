//! Gateway-level handlers. Feature handlers live with their modules
//! (`user_auth::handlers`, `call_relay::handlers`).

pub mod health;

pub use health::health_check;
