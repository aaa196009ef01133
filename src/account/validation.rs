//! Format rules for signup fields
//!
//! The regexes are shared with the `validator` derive on the signup request.

use once_cell::sync::Lazy;
use regex::Regex;

/// `local@domain.tld` with no whitespace and no extra `@`
pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Exactly ten ASCII digits
pub static MOBILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("mobile regex"));

/// Validation errors raised by the credential store itself
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    Empty { field: &'static str },
}

/// Reject empty (or whitespace-only) required fields
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}
