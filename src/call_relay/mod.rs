//! Call token relay
//!
//! Exchanges the server-held provider credential for a per-call access token
//! the browser can hand to the voice SDK. Stateless; failures are surfaced,
//! never retried here.

pub mod client;
pub mod error;
pub mod handlers;

pub use client::CallTokenRelay;
pub use error::RelayError;
