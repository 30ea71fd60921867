//! Security headers attached to every response, success or error.

use hyper::http::response::Builder;

/// Allowed origins for scripts, styles, fonts, images and connections
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' 'unsafe-inline' https://cdn.tailwindcss.com; style-src 'self' 'unsafe-inline' https://fonts.googleapis.com https://cdnjs.cloudflare.com; font-src 'self' https://fonts.gstatic.com https://cdnjs.cloudflare.com; img-src 'self' data: https://images.unsplash.com; connect-src 'self'";

/// Fixed header set, emitted verbatim and in this order
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("X-XSS-Protection", "1; mode=block"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ("Content-Security-Policy", CONTENT_SECURITY_POLICY),
];

/// Apply the security headers to a response builder
pub fn apply(builder: Builder) -> Builder {
    SECURITY_HEADERS
        .iter()
        .fold(builder, |b, (name, value)| b.header(*name, *value))
}
