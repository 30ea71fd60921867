//! Logger module
//!
//! Installs the `tracing` subscriber and provides the server lifecycle and
//! access log helpers. Access lines are emitted at target `access`.

mod format;

pub use format::AccessLogEntry;

use std::fs::{File, OpenOptions};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use crate::config::{Config, LoggingConfig};
use crate::error::StartupError;

/// Initialize the global subscriber with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), StartupError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| StartupError::Logger(format!("unknown log level '{}'", config.level)))?;

    let builder = tracing_subscriber::fmt().with_max_level(level);
    let result = match config.file.as_deref() {
        Some(path) => {
            let file = open_log_file(path)
                .map_err(|e| StartupError::Logger(format!("cannot open '{path}': {e}")))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.try_init(),
    };

    result.map_err(|e| StartupError::Logger(e.to_string()))
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Server running at http://{addr}/");
    tracing::info!("Serving files from: {}", config.files.root.display());
    tracing::info!(
        "Index: {}, fallback: {}",
        config.files.index_file,
        config.files.fallback_file
    );
    match config.server.workers {
        Some(workers) => tracing::info!("Worker threads: {workers}"),
        None => tracing::info!("Worker threads: default (CPU cores)"),
    }
    if let Some(ref path) = config.logging.file {
        tracing::info!("Log file: {path}");
    }
    tracing::info!("Security headers enabled, cache policy enabled");
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("{signal} received, shutting down gracefully");
}

pub fn log_server_stopped(drained: bool) {
    if drained {
        tracing::info!("Server closed");
    } else {
        tracing::warn!("Server closed before all connections finished");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
