//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

use std::path::Path;

/// Content type used for unknown extensions
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type of the index and fallback documents
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Lower-cased extension of the final path segment, empty when there is none
///
/// Dot-files such as `.env` have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Get MIME Content-Type based on a lower-cased file extension
///
/// # Examples
/// ```
/// use spa_server::http::mime::get_content_type;
/// assert_eq!(get_content_type("html"), "text/html; charset=utf-8");
/// assert_eq!(get_content_type("css"), "text/css; charset=utf-8");
/// assert_eq!(get_content_type(""), "application/octet-stream");
/// ```
pub fn get_content_type(extension: &str) -> &'static str {
    match extension {
        // Text
        "html" | "htm" => HTML_CONTENT_TYPE,
        "css" => "text/css; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml; charset=utf-8",
        "webmanifest" => "application/manifest+json; charset=utf-8",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" | "map" => "application/json; charset=utf-8",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Media
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",

        // Documents
        "pdf" => "application/pdf",

        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Content type for a resolved file path
pub fn content_type_for(path: &Path) -> &'static str {
    get_content_type(&extension_of(path))
}
