//! Static file server for single-page applications
//!
//! Serves files from a document root and answers every path that does not
//! name a file with the application shell, so client-side routes work on
//! reload and deep links.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
