//! Error types
//!
//! Request-level rejections, file serving failures and fatal startup errors.
//! Public response bodies are fixed strings; error details only reach the logs.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status for any fatal startup failure
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when the listen address is already taken
pub const EXIT_ADDR_IN_USE: u8 = 2;

/// Rejection produced by the path guard before the filesystem is touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("malformed request target")]
    MalformedRequest,
    #[error("request target contains invalid characters")]
    InvalidCharacters,
    #[error("request target escapes the document root")]
    TraversalAttempt,
}

impl GuardError {
    /// HTTP status code sent to the client
    pub const fn status(self) -> u16 {
        match self {
            Self::MalformedRequest | Self::InvalidCharacters => 400,
            Self::TraversalAttempt => 403,
        }
    }

    /// Plain-text response body
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::MalformedRequest => "400 Bad Request - Malformed URL",
            Self::InvalidCharacters => "400 Bad Request",
            Self::TraversalAttempt => "403 Forbidden",
        }
    }
}

/// Failure while serving a resolved path
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to read fallback document '{}': {source}", path.display())]
    Fallback { path: PathBuf, source: io::Error },

    #[error("'{}' resolves outside the document root", path.display())]
    Escape { path: PathBuf },
}

impl ServeError {
    pub const fn status(&self) -> u16 {
        match self {
            Self::Escape { .. } => 403,
            Self::Read { .. } | Self::Fallback { .. } => 500,
        }
    }

    /// Plain-text response body, never the underlying detail
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Escape { .. } => "403 Forbidden",
            Self::Read { .. } | Self::Fallback { .. } => "500 Internal Server Error",
        }
    }
}

/// Fatal error raised before or while starting the listener
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("cannot resolve listen address '{addr}': {reason}")]
    Resolve { addr: String, reason: String },

    #[error("address {0} is already in use")]
    AddrInUse(SocketAddr),

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("failed to initialize logging: {0}")]
    Logger(String),

    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] io::Error),
}

impl StartupError {
    /// Classify a bind error, keeping address-in-use distinct
    pub fn from_bind(addr: SocketAddr, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::AddrInUse {
            Self::AddrInUse(addr)
        } else {
            Self::Bind { addr, source }
        }
    }

    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::AddrInUse(_) => EXIT_ADDR_IN_USE,
            _ => EXIT_FAILURE,
        }
    }
}
