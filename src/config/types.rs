// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_INDEX_FILE: &str = "index.html";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Authority used to parse request targets when the Host header is absent
    pub default_host: String,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            default_host: DEFAULT_HOST.to_string(),
            workers: None,
        }
    }
}

/// Document root configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// Directory under which every served file must resolve
    pub root: PathBuf,
    /// Served for requests to `/`
    pub index_file: String,
    /// Served for any path that does not name a file
    pub fallback_file: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            fallback_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: "combined".to_string(),
            file: None,
        }
    }
}

/// Connection handling configuration, durations in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub connection_timeout: u64,
    pub header_read_timeout: u64,
    /// Upper bound on waiting for in-flight connections at shutdown
    pub shutdown_timeout: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            connection_timeout: 60,
            header_read_timeout: 10,
            shutdown_timeout: 30,
        }
    }
}
