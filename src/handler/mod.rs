//! Request handler module
//!
//! Resolves request targets to files under the document root and serves them,
//! falling back to the application shell for client-side routes.

pub mod guard;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, respond, RequestContext};
