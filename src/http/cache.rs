//! HTTP cache control module
//!
//! Classifies files into long-lived static assets and documents that must be
//! revalidated, and provides `ETag` generation and conditional request handling.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use super::mime::extension_of;

/// One year, immutable: fingerprinted bundles, images and fonts
pub const STATIC_ASSET_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
/// Navigation documents are always rechecked
pub const DOCUMENT_CACHE_CONTROL: &str = "no-cache, must-revalidate";

const STATIC_ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "woff", "woff2", "ttf",
    "otf",
];

/// Generate `ETag` using fast hashing
///
/// The tag depends only on the content, so it stays the same across requests
/// and restarts until the file changes.
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak validators: `W/"abc123"`
/// - Wildcard: `*`
///
/// # Returns
/// Returns true if matched (should return 304), false otherwise
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Cache control policy derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Stylesheets, scripts, images and fonts
    StaticAsset,
    /// Everything else, notably the index and fallback documents
    Document,
}

impl CachePolicy {
    pub fn for_extension(extension: &str) -> Self {
        if STATIC_ASSET_EXTENSIONS.contains(&extension) {
            Self::StaticAsset
        } else {
            Self::Document
        }
    }

    pub fn for_path(path: &Path) -> Self {
        Self::for_extension(&extension_of(path))
    }

    /// Convert to Cache-Control header value
    pub const fn cache_control(self) -> &'static str {
        match self {
            Self::StaticAsset => STATIC_ASSET_CACHE_CONTROL,
            Self::Document => DOCUMENT_CACHE_CONTROL,
        }
    }

    /// Whether responses under this policy carry an `ETag`
    pub const fn uses_validator(self) -> bool {
        matches!(self, Self::StaticAsset)
    }

    /// `ETag` for `content` when this policy uses one
    pub fn validator(self, content: &[u8]) -> Option<String> {
        self.uses_validator().then(|| generate_etag(content))
    }

    /// Cache headers for a response, with the validator already computed
    pub fn headers(self, etag: Option<&str>) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Cache-Control", self.cache_control().to_string())];
        if let Some(etag) = etag {
            headers.push(("ETag", etag.to_string()));
        }
        headers
    }
}
