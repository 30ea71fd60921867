//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method check, path guard, file
//! serving, and the per-request error boundary.

use crate::config::AppState;
use crate::handler::{guard, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HOST, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Request target as received, query included
    pub target: String,
    pub host: Option<String>,
    pub if_none_match: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            target: req.uri().to_string(),
            host: header_value(req, &HOST),
            if_none_match: header_value(req, &IF_NONE_MATCH),
        }
    }
}

fn header_value<B>(req: &Request<B>, name: &HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);
    let entry = state
        .access_log()
        .then(|| access_entry(&req, &ctx, peer_addr));

    let response = respond(Arc::clone(&state), ctx).await;

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Run the pipeline in its own task so a panic becomes a 500, not a dropped connection
pub async fn respond(state: Arc<AppState>, ctx: RequestContext) -> Response<Full<Bytes>> {
    let target = ctx.target.clone();
    match tokio::spawn(async move { process(&state, &ctx).await }).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Request handler failed for '{target}': {e}");
            http::build_internal_error_response()
        }
    }
}

async fn process(state: &AppState, ctx: &RequestContext) -> Response<Full<Bytes>> {
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&ctx.method) {
        return resp;
    }

    // 2. Validate and confine the target
    let resolved = match guard::resolve(
        &ctx.target,
        ctx.host.as_deref(),
        &state.config.server.default_host,
        &state.config.files,
    ) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!("Blocked request '{}': {e}", ctx.target);
            return http::build_error_response(e.status(), e.public_message());
        }
    };

    // 3. Serve the file or the fallback document
    let is_head = ctx.method == Method::HEAD;
    match static_files::serve(&resolved, state, ctx.if_none_match.as_deref(), is_head).await {
        Ok(resp) => resp,
        Err(e) => {
            if e.status() == 403 {
                tracing::warn!("Blocked request '{}': {e}", ctx.target);
            } else {
                tracing::error!("Error serving '{}': {e}", ctx.target);
            }
            http::build_error_response(e.status(), e.public_message())
        }
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            tracing::warn!("Method not allowed: {method}");
            Some(http::build_405_response())
        }
    }
}

fn access_entry<B>(req: &Request<B>, ctx: &RequestContext, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        ctx.method.to_string(),
        ctx.target.clone(),
    );
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_value(req, &REFERER);
    entry.user_agent = header_value(req, &USER_AGENT);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
