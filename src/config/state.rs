// Application state module
// Read-only state shared by every connection and request task

use std::path::{Path, PathBuf};

use super::types::Config;

/// Application state
///
/// Built once at startup and shared behind an `Arc`; nothing in it is
/// mutated afterwards, so request tasks read it without locking.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn document_root(&self) -> &Path {
        &self.config.files.root
    }

    /// Location of the fallback document inside the document root
    pub fn fallback_path(&self) -> PathBuf {
        self.config.files.root.join(&self.config.files.fallback_file)
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
