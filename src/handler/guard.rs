//! Path resolver and guard
//!
//! Turns a raw request target into a path confined to the document root, or
//! rejects it. Purely lexical: the filesystem is never touched here.
//!
//! Every check runs against several views of the target: the raw path as
//! received and the path the URL parser produced, each decoded up to
//! [`MAX_DECODE_DEPTH`] times. URL parsing collapses dot-segments, so only the
//! raw view still shows `/../` escapes; repeated decoding exposes
//! double-encoded separators and NULs.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::FilesConfig;
use crate::error::GuardError;

/// Number of percent-decoding passes inspected per view
pub const MAX_DECODE_DEPTH: usize = 3;

/// A filesystem path that starts with the document root and has no `..`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    root_document: bool,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// True when the request was for `/` and the index document was substituted
    pub const fn is_root_document(&self) -> bool {
        self.root_document
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Resolve a request target against the document root
///
/// `host` is the request's Host header; `default_host` stands in when it is
/// absent or empty. Query and fragment never influence the result.
pub fn resolve(
    target: &str,
    host: Option<&str>,
    default_host: &str,
    files: &FilesConfig,
) -> Result<ResolvedPath, GuardError> {
    let raw_layers = decode_layers(raw_path(target));
    if raw_layers.iter().any(|layer| contains_null(layer)) {
        return Err(GuardError::InvalidCharacters);
    }

    let host = host.filter(|h| !h.trim().is_empty()).unwrap_or(default_host);
    let url = parse_target(target, host)?;

    let decoded = strict_decode(url.path())?;
    let mut url_layers = vec![Cow::Borrowed(url.path())];
    url_layers.extend(decode_layers(&decoded));
    if url_layers.iter().any(|layer| contains_null(layer)) {
        return Err(GuardError::InvalidCharacters);
    }

    if raw_layers
        .iter()
        .chain(url_layers.iter())
        .any(|layer| escapes_root(layer))
    {
        return Err(GuardError::TraversalAttempt);
    }

    confine(&files.root, &files.index_file, &segments(&decoded))
}

/// Path portion of the raw target, before any query or fragment
///
/// For absolute-form (`http://host/p`) and network-path (`//host/p`) targets
/// the scheme and authority are dropped, so they are not counted as segments.
fn raw_path(target: &str) -> &str {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let after_scheme = match path.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => path,
    };

    let mut chars = after_scheme.chars();
    let has_authority =
        chars.next().is_some_and(is_separator) && chars.next().is_some_and(is_separator);
    if !has_authority {
        return after_scheme;
    }

    let authority_and_path = &after_scheme[2..];
    authority_and_path
        .find(is_separator)
        .map_or("/", |i| &authority_and_path[i..])
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_scheme(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn parse_target(target: &str, host: &str) -> Result<Url, GuardError> {
    let base = Url::parse(&format!("http://{host}/")).map_err(|_| GuardError::MalformedRequest)?;
    base.join(target).map_err(|_| GuardError::MalformedRequest)
}

/// Decode once, rejecting stray `%` and non-UTF-8 results
fn strict_decode(path: &str) -> Result<String, GuardError> {
    let bytes = path.as_bytes();
    for (i, _) in path.match_indices('%') {
        let well_formed = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(GuardError::MalformedRequest);
        }
    }

    percent_decode_str(path)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| GuardError::MalformedRequest)
}

/// The input followed by up to `MAX_DECODE_DEPTH` successive decodings
///
/// Stops early once decoding no longer changes the text.
fn decode_layers(input: &str) -> Vec<Cow<'_, str>> {
    let mut layers = vec![Cow::Borrowed(input)];
    for _ in 0..MAX_DECODE_DEPTH {
        let Some(last) = layers.last() else { break };
        let next = percent_decode_str(last).decode_utf8_lossy().into_owned();
        if next == **last {
            break;
        }
        layers.push(Cow::Owned(next));
    }
    layers
}

fn contains_null(text: &str) -> bool {
    text.contains('\0') || text.to_ascii_lowercase().contains("%00")
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Whether lexical normalization would climb above the root
fn escapes_root(path: &str) -> bool {
    let mut depth = 0usize;
    for segment in path.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return true,
            },
            _ => depth += 1,
        }
    }
    false
}

/// Normalized segments of an already-checked path
fn segments(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for segment in path.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out
}

/// Join the segments under the root, substituting the index for `/`
fn confine(root: &Path, index_file: &str, segments: &[&str]) -> Result<ResolvedPath, GuardError> {
    let root_document = segments.is_empty();
    let path = if root_document {
        root.join(index_file)
    } else {
        segments.iter().fold(root.to_path_buf(), |p, s| p.join(s))
    };

    let confined = path
        .strip_prefix(root)
        .is_ok_and(|rest| rest.components().all(|c| matches!(c, Component::Normal(_))));
    if !confined {
        return Err(GuardError::TraversalAttempt);
    }

    Ok(ResolvedPath {
        path,
        root_document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> FilesConfig {
        FilesConfig {
            root: PathBuf::from("./public"),
            index_file: "index.html".to_string(),
            fallback_file: "index.html".to_string(),
        }
    }

    fn resolve_target(target: &str) -> Result<ResolvedPath, GuardError> {
        resolve(target, Some("localhost:3000"), "localhost", &files())
    }

    fn resolved(target: &str) -> PathBuf {
        resolve_target(target).unwrap().as_path().to_path_buf()
    }

    #[test]
    fn test_root_substitutes_index() {
        let r = resolve_target("/").unwrap();
        assert!(r.is_root_document());
        assert_eq!(r.as_path(), Path::new("./public/index.html"));
        assert_eq!(resolved(""), PathBuf::from("./public/index.html"));
        assert_eq!(resolved("/?page=2"), PathBuf::from("./public/index.html"));
    }

    #[test]
    fn test_plain_paths() {
        assert_eq!(resolved("/styles/app.css"), PathBuf::from("./public/styles/app.css"));
        assert!(!resolve_target("/styles/app.css").unwrap().is_root_document());
        assert_eq!(resolved("/a/./b//c.js"), PathBuf::from("./public/a/b/c.js"));
        assert_eq!(resolved("/docs/"), PathBuf::from("./public/docs"));
    }

    #[test]
    fn test_absolute_form_targets() {
        assert_eq!(
            resolved("http://localhost/styles/app.css"),
            PathBuf::from("./public/styles/app.css")
        );
        assert_eq!(
            resolved("http://example.com:8080/a/../b.js?x=1"),
            PathBuf::from("./public/b.js")
        );
        assert!(resolve_target("http://localhost").unwrap().is_root_document());
    }

    #[test]
    fn test_raw_path_drops_scheme_and_authority() {
        assert_eq!(raw_path("/a/b?q=1"), "/a/b");
        assert_eq!(raw_path("http://host:80/a/../b"), "/a/../b");
        assert_eq!(raw_path("https://host"), "/");
        assert_eq!(raw_path("//host/../x"), "/../x");
        assert_eq!(raw_path("http:\\\\host\\..\\x"), "\\..\\x");
        assert_eq!(raw_path("/files/a:b"), "/files/a:b");
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        assert_eq!(
            resolved("/styles/app.css?v=../../etc#../x"),
            PathBuf::from("./public/styles/app.css")
        );
        assert_eq!(resolved("/app.js?x=%00"), PathBuf::from("./public/app.js"));
    }

    #[test]
    fn test_inner_parent_segments_stay_confined() {
        assert_eq!(resolved("/a/b/../c.css"), PathBuf::from("./public/a/c.css"));
        assert_eq!(resolved("/a/%2e%2e/b.css"), PathBuf::from("./public/b.css"));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(resolved("/caf%C3%A9.html"), PathBuf::from("./public/café.html"));
        assert_eq!(resolved("/my%20file.txt"), PathBuf::from("./public/my file.txt"));
    }

    #[test]
    fn test_traversal_rejected() {
        let attacks = [
            "/..",
            "/../etc/passwd",
            "/../../../etc/passwd",
            "/a/../../etc/passwd",
            "/static/../../secret",
            "/%2e%2e/%2e%2e/etc/passwd",
            "/%2E%2E/etc/passwd",
            "/.%2e/etc/passwd",
            "/%2e%2e%2f%2e%2e%2fetc%2fpasswd",
            "/..%2f..%2fetc%2fpasswd",
            "/..\\..\\etc\\passwd",
            "/%2e%2e%5c%2e%2e%5cetc%5cpasswd",
            "/..%5c..%5cwindows",
            "/%252e%252e%252fetc%252fpasswd",
            "/%25252e%25252e%25252fetc",
            "/assets/..%252f..%252f..%252fetc",
            "http://localhost/../../etc/passwd",
            "http://localhost/%2e%2e/%2e%2e/etc/passwd",
            "http://localhost:3000/..%2f..%2fetc%2fpasswd",
            "HTTP://example.com/a/../../etc",
            "//localhost/../../etc/passwd",
            "http://localhost/..",
        ];
        for attack in attacks {
            assert_eq!(
                resolve_target(attack),
                Err(GuardError::TraversalAttempt),
                "{attack}"
            );
        }
    }

    #[test]
    fn test_null_bytes_rejected() {
        let attacks = [
            "/index.html%00.png",
            "/%00",
            "/a%2500b",
            "/%2e%2e/%00",
            "/../%00",
            "/bad%zz%00",
            "/img%252500.png",
        ];
        for attack in attacks {
            assert_eq!(
                resolve_target(attack),
                Err(GuardError::InvalidCharacters),
                "{attack}"
            );
        }
    }

    #[test]
    fn test_malformed_rejected() {
        for target in ["/bad%zzpath", "/100%", "/trail%4", "/%c3%28"] {
            assert_eq!(
                resolve_target(target),
                Err(GuardError::MalformedRequest),
                "{target}"
            );
        }
    }

    #[test]
    fn test_host_handling() {
        let cfg = files();
        assert_eq!(
            resolve("/bad host", Some("bad host"), "localhost", &cfg),
            Err(GuardError::MalformedRequest)
        );
        assert!(resolve("/app.js", None, "localhost", &cfg).is_ok());
        assert!(resolve("/app.js", Some(""), "localhost", &cfg).is_ok());
        assert!(resolve("/app.js", Some("example.com:8080"), "localhost", &cfg).is_ok());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let a = resolve_target("/assets/logo.svg?cache=1").unwrap();
        let b = resolve_target("/assets/logo.svg?cache=1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolved_paths_never_contain_parent() {
        for target in ["/x/../y", "/x/%2e%2e/y", "/./y", "/y/."] {
            let path = resolved(target);
            assert!(path.starts_with("./public"), "{target}");
            assert!(
                !path.components().any(|c| c == Component::ParentDir),
                "{target}"
            );
        }
    }

    #[test]
    fn test_escape_detection() {
        assert!(escapes_root("/.."));
        assert!(escapes_root("a/../../b"));
        assert!(escapes_root("\\..\\x"));
        assert!(!escapes_root("/a/../b"));
        assert!(!escapes_root("/..foo/bar.."));
    }
}
