//! HTTP protocol layer module
//!
//! Content types, cache policy, security headers and response builders,
//! decoupled from how a request is resolved to a file.

pub mod cache;
pub mod mime;
pub mod response;
pub mod security;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use response::{
    build_304_response, build_405_response, build_error_response, build_file_response,
    build_internal_error_response, build_options_response,
};
