// Configuration module entry point
// Loads layered configuration: defaults, optional file, environment

mod state;
mod types;

use std::net::{SocketAddr, ToSocketAddrs};

use ::config::{ConfigError, Environment, File};

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, FilesConfig, LoggingConfig, PerformanceConfig, ServerConfig, DEFAULT_HOST,
    DEFAULT_INDEX_FILE, DEFAULT_PORT,
};

/// Config file used when `SPA_CONFIG` is not set (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "spa-server";
pub const CONFIG_PATH_ENV: &str = "SPA_CONFIG";

impl Config {
    /// Load configuration from `SPA_CONFIG` or the default file name,
    /// then apply `SPA_*` and `HOST`/`PORT` environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::load_with_overrides(
            config_path,
            std::env::var("HOST").ok(),
            std::env::var("PORT").ok(),
        )
    }

    /// Load configuration with explicit host/port overrides
    pub fn load_with_overrides(
        config_path: &str,
        host: Option<String>,
        port: Option<String>,
    ) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.default_host", DEFAULT_HOST)?
            .set_default("files.root", ".")?
            .set_default("files.index_file", DEFAULT_INDEX_FILE)?
            .set_default("files.fallback_file", DEFAULT_INDEX_FILE)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 60)?
            .set_default("performance.header_read_timeout", 10)?
            .set_default("performance.shutdown_timeout", 30)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix("SPA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.host", host)?
            .set_override_option("server.port", port)?
            .build()?;

        settings.try_deserialize()
    }

    /// Resolve the listen address; `localhost` goes through the system resolver
    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let host = self.server.host.as_str();
        let display = format!("{host}:{}", self.server.port);
        let mut addrs = (host, self.server.port)
            .to_socket_addrs()
            .map_err(|e| StartupError::Resolve {
                addr: display.clone(),
                reason: e.to_string(),
            })?;

        addrs.next().ok_or_else(|| StartupError::Resolve {
            addr: display,
            reason: "no addresses found".to_string(),
        })
    }
}
