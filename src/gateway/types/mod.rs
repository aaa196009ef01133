//! Gateway types module
//!
//! - [`response`]: JSON bodies returned by the HTTP surface

pub mod response;

pub use response::{
    CheckAuthResponse, CreateCallResponse, ErrorResponse, HealthResponse, LoginResponse,
    MessageResponse,
};
