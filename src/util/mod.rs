//! Utility functions for common operations.
//!
//! - **URL validation**: scheme and host checks for feed and API URLs
//! - **Text processing**: character-count truncation for status bodies

mod text;
mod url_validator;

pub use text::{truncate_chars, ELLIPSIS};
pub use url_validator::{validate_url, UrlValidationError};
