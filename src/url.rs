//! Shareable link composition.
//!
//! Without a configured public base URL the `host` and `x-forwarded-proto`
//! headers are trusted as sent. That is only sound behind a reverse proxy
//! which sets them; a stricter [`BaseUrlResolver`] can be swapped in.

use std::sync::Arc;

use axum::http::HeaderMap;

/// Host assumed when a request carries no `host` header.
const FALLBACK_HOST: &str = "localhost:3000";

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// The request headers that take part in link composition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOrigin {
    pub host: Option<String>,
    pub forwarded_proto: Option<String>,
}

impl RequestOrigin {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        };

        RequestOrigin {
            host: header("host").filter(|host| !host.is_empty()),
            forwarded_proto: header(FORWARDED_PROTO),
        }
    }
}

pub trait BaseUrlResolver: Send + Sync {
    /// Scheme and authority to prefix paste paths with, without a trailing slash.
    fn base_url(&self, origin: &RequestOrigin) -> String;
}

/// Always uses the configured base URL.
#[derive(Debug, Clone)]
pub struct StaticBaseUrl {
    base: String,
}

impl StaticBaseUrl {
    pub fn new(base: &str) -> Self {
        StaticBaseUrl {
            base: base.strip_suffix('/').unwrap_or(base).to_owned(),
        }
    }
}

impl BaseUrlResolver for StaticBaseUrl {
    fn base_url(&self, _origin: &RequestOrigin) -> String {
        self.base.clone()
    }
}

/// Derives the base URL from the request headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderBaseUrl;

impl BaseUrlResolver for HeaderBaseUrl {
    fn base_url(&self, origin: &RequestOrigin) -> String {
        let host = origin.host.as_deref().unwrap_or(FALLBACK_HOST);
        let proto = match &origin.forwarded_proto {
            Some(proto) => proto.as_str(),
            None if host.contains("localhost") => "http",
            None => "https",
        };
        format!("{proto}://{host}")
    }
}

/// Pick the resolver for an optional configured base URL. An empty setting
/// counts as unset.
pub fn resolver(public_base_url: Option<&str>) -> Arc<dyn BaseUrlResolver> {
    match public_base_url {
        Some(base) if !base.is_empty() => Arc::new(StaticBaseUrl::new(base)),
        _ => Arc::new(HeaderBaseUrl),
    }
}

pub fn paste_url(resolver: &dyn BaseUrlResolver, origin: &RequestOrigin, id: &str) -> String {
    format!("{base}/p/{id}", base = resolver.base_url(origin))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn origin(host: Option<&str>, forwarded_proto: Option<&str>) -> RequestOrigin {
        RequestOrigin {
            host: host.map(Into::into),
            forwarded_proto: forwarded_proto.map(Into::into),
        }
    }

    #[test]
    fn localhost_defaults_to_http() {
        let url = paste_url(&HeaderBaseUrl, &origin(Some("localhost:3000"), None), "abc");
        assert_eq!(url, "http://localhost:3000/p/abc");
    }

    #[test]
    fn other_hosts_default_to_https() {
        let url = paste_url(&HeaderBaseUrl, &origin(Some("example.com"), None), "abc");
        assert_eq!(url, "https://example.com/p/abc");
    }

    #[test]
    fn forwarded_proto_wins() {
        let url = paste_url(
            &HeaderBaseUrl,
            &origin(Some("example.com"), Some("https")),
            "xyz",
        );
        assert_eq!(url, "https://example.com/p/xyz");

        let url = paste_url(
            &HeaderBaseUrl,
            &origin(Some("localhost:3000"), Some("https")),
            "xyz",
        );
        assert_eq!(url, "https://localhost:3000/p/xyz");
    }

    #[test]
    fn missing_host() {
        let url = paste_url(&HeaderBaseUrl, &origin(None, None), "abc");
        assert_eq!(url, "http://localhost:3000/p/abc");
    }

    #[test]
    fn configured_base_ignores_headers() {
        let resolver = resolver(Some("https://short.ly/"));
        let url = paste_url(
            resolver.as_ref(),
            &origin(Some("localhost:3000"), Some("http")),
            "q1",
        );
        assert_eq!(url, "https://short.ly/p/q1");
    }

    #[test]
    fn only_one_trailing_slash_is_stripped() {
        let url = paste_url(&StaticBaseUrl::new("https://short.ly//"), &origin(None, None), "q1");
        assert_eq!(url, "https://short.ly//p/q1");
    }

    #[test]
    fn empty_base_is_unset() {
        let resolver = resolver(Some(""));
        let url = paste_url(resolver.as_ref(), &origin(Some("example.com"), None), "q1");
        assert_eq!(url, "https://example.com/p/q1");
    }

    #[test]
    fn composition_is_repeatable() {
        let origin = origin(Some("example.com"), Some("http"));
        let first = paste_url(&HeaderBaseUrl, &origin, "id");
        let second = paste_url(&HeaderBaseUrl, &origin, "id");
        assert_eq!(first, second);
    }

    #[test]
    fn origin_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("example.com"));
        headers.insert(FORWARDED_PROTO, HeaderValue::from_static("https"));
        assert_eq!(
            RequestOrigin::from_headers(&headers),
            origin(Some("example.com"), Some("https"))
        );

        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_bytes(b"caf\xe9.example").unwrap());
        assert_eq!(
            RequestOrigin::from_headers(&headers).host.as_deref(),
            Some("caf\u{fffd}.example")
        );

        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static(""));
        assert_eq!(RequestOrigin::from_headers(&headers), origin(None, None));
    }
}
