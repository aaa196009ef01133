//! WebSocket broadcast relay
//!
//! Every text or binary frame a client sends is forwarded to all other
//! connected clients.

pub mod connection;
pub mod handler;

pub use connection::{ConnectionId, ConnectionManager};
pub use handler::ws_handler;
