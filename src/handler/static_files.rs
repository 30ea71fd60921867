//! Static file serving module
//!
//! Existence check, file loading and the fallback to the application shell
//! for paths that do not name a file.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::guard::ResolvedPath;
use crate::http::{self, cache, mime, CachePolicy};

/// Outcome of the existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    /// A regular file under the document root
    File,
    /// Missing, a directory, or not inspectable
    Missing,
}

/// Serve a resolved path, falling back to the configured document
///
/// A read failure on an existing file is final: it does not fall back.
pub async fn serve(
    resolved: &ResolvedPath,
    state: &AppState,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let path = resolved.as_path();
    match lookup(path, state.document_root()).await? {
        Lookup::File => serve_file(path, if_none_match, is_head).await,
        Lookup::Missing => {
            tracing::debug!("No file at '{}', serving fallback", path.display());
            serve_fallback(state, is_head).await
        }
    }
}

async fn lookup(path: &Path, root: &Path) -> Result<Lookup, ServeError> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {
            ensure_within_root(path, root).await?;
            Ok(Lookup::File)
        }
        _ => Ok(Lookup::Missing),
    }
}

/// Symlinks may point outside the root even though the path is lexically confined
async fn ensure_within_root(path: &Path, root: &Path) -> Result<(), ServeError> {
    let read_error = |source: std::io::Error| ServeError::Read {
        path: path.to_path_buf(),
        source,
    };
    let root_canonical = fs::canonicalize(root).await.map_err(read_error)?;
    let file_canonical = fs::canonicalize(path).await.map_err(read_error)?;

    if file_canonical.starts_with(&root_canonical) {
        Ok(())
    } else {
        Err(ServeError::Escape {
            path: file_canonical,
        })
    }
}

async fn serve_file(
    path: &Path,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let content = fs::read(path).await.map_err(|source| ServeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let policy = CachePolicy::for_path(path);
    let content_type = mime::content_type_for(path);
    let etag = policy.validator(&content);
    if let Some(ref etag) = etag {
        if cache::check_etag_match(if_none_match, etag) {
            return Ok(http::build_304_response(etag, content_type, policy));
        }
    }

    Ok(http::build_file_response(
        Bytes::from(content),
        content_type,
        policy,
        etag.as_deref(),
        is_head,
    ))
}

async fn serve_fallback(
    state: &AppState,
    is_head: bool,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let path = state.fallback_path();
    let content = fs::read(&path)
        .await
        .map_err(|source| ServeError::Fallback { path, source })?;

    // The shell is a navigation document whatever its extension
    Ok(http::build_file_response(
        Bytes::from(content),
        mime::HTML_CONTENT_TYPE,
        CachePolicy::Document,
        None,
        is_head,
    ))
}
