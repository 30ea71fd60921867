//! HTTP response building module
//!
//! Every builder starts from the security header set, then adds cache headers
//! and the content type, so no response class can miss them.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::{Response, StatusCode};

use super::cache::CachePolicy;
use super::security::{self, SECURITY_HEADERS};

/// Content type of every plain-text error body
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub const INTERNAL_ERROR_BODY: &str = "500 Internal Server Error";

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build a file response (requested file or fallback document)
///
/// `etag` is the validator already computed for `data`, if the policy uses one.
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    policy: CachePolicy,
    etag: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let mut builder = security::apply(Response::builder().status(200));
    for (name, value) in policy.headers(etag) {
        builder = builder.header(name, value);
    }

    let body = if is_head { Bytes::new() } else { data };

    builder
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            build_internal_error_response()
        })
}

/// Build 304 Not Modified response
///
/// Carries the content type the full response would have had.
pub fn build_304_response(
    etag: &str,
    content_type: &str,
    policy: CachePolicy,
) -> Response<Full<Bytes>> {
    security::apply(Response::builder().status(304))
        .header("Cache-Control", policy.cache_control())
        .header("ETag", etag)
        .header("Content-Type", content_type)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            build_internal_error_response()
        })
}

/// Build a short plain-text error response
pub fn build_error_response(status: u16, message: &'static str) -> Response<Full<Bytes>> {
    security::apply(Response::builder().status(status))
        .header("Content-Type", TEXT_CONTENT_TYPE)
        .body(Full::new(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            build_internal_error_response()
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    security::apply(Response::builder().status(405))
        .header("Content-Type", TEXT_CONTENT_TYPE)
        .header("Allow", ALLOWED_METHODS)
        .body(Full::new(Bytes::from_static(b"405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            build_internal_error_response()
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    security::apply(Response::builder().status(204))
        .header("Allow", ALLOWED_METHODS)
        .header("Content-Type", TEXT_CONTENT_TYPE)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            build_internal_error_response()
        })
}

/// Generic 500 response, built without the fallible builder
pub fn build_internal_error_response() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from_static(
        INTERNAL_ERROR_BODY.as_bytes(),
    )));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    let headers = resp.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers.insert("Content-Type", HeaderValue::from_static(TEXT_CONTENT_TYPE));
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!("Failed to build {status} response: {error}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::cache::{DOCUMENT_CACHE_CONTROL, STATIC_ASSET_CACHE_CONTROL};
    use http_body_util::BodyExt;

    fn assert_security_headers(resp: &Response<Full<Bytes>>) {
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(resp.headers()[name], value, "missing {name}");
        }
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_file_response() {
        let resp = build_file_response(
            Bytes::from_static(b"body{}"),
            "text/css; charset=utf-8",
            CachePolicy::StaticAsset,
            Some("\"abc\""),
            false,
        );
        assert_eq!(resp.status(), 200);
        assert_security_headers(&resp);
        assert_eq!(resp.headers()["Cache-Control"], STATIC_ASSET_CACHE_CONTROL);
        assert_eq!(resp.headers()["ETag"], "\"abc\"");
        assert_eq!(resp.headers()["Content-Type"], "text/css; charset=utf-8");
        assert_eq!(body_bytes(resp).await, "body{}");
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let resp = build_file_response(
            Bytes::from_static(b"<html></html>"),
            "text/html; charset=utf-8",
            CachePolicy::Document,
            None,
            true,
        );
        assert_eq!(resp.headers()["Content-Length"], "13");
        assert_eq!(resp.headers()["Cache-Control"], DOCUMENT_CACHE_CONTROL);
        assert!(!resp.headers().contains_key("ETag"));
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_responses_carry_security_headers() {
        for (status, message) in [(400, "400 Bad Request"), (403, "403 Forbidden")] {
            let resp = build_error_response(status, message);
            assert_eq!(resp.status(), status);
            assert_security_headers(&resp);
            assert_eq!(resp.headers()["Content-Type"], TEXT_CONTENT_TYPE);
            assert_eq!(body_bytes(resp).await, message);
        }

        let resp = build_internal_error_response();
        assert_eq!(resp.status(), 500);
        assert_security_headers(&resp);
        assert_eq!(body_bytes(resp).await, INTERNAL_ERROR_BODY);

        let resp = build_405_response();
        assert_eq!(resp.headers()["Allow"], ALLOWED_METHODS);
        assert_security_headers(&resp);
    }

    #[test]
    fn test_304_response() {
        let resp = build_304_response(
            "\"abc\"",
            "text/css; charset=utf-8",
            CachePolicy::StaticAsset,
        );
        assert_eq!(resp.status(), 304);
        assert_eq!(resp.headers()["ETag"], "\"abc\"");
        assert_eq!(resp.headers()["Content-Type"], "text/css; charset=utf-8");
        assert_security_headers(&resp);
    }
}
