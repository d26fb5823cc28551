//! Shared HTTP utilities for the redirector workspace.
//!
//! Provides JSON error bodies, HTML escaping, short-URL building, and time
//! formatting used by the server crate.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::SystemTime;

// ============================================================================
// JSON Response Helpers (framework-agnostic)
// ============================================================================

/// Flat error body: `{"error": "<code>"}`.
pub fn json_err(code: &str) -> serde_json::Value {
    serde_json::json!({ "error": code })
}

// ============================================================================
// HTML Helpers
// ============================================================================

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Encode a string as a JavaScript string literal safe to place inside a
/// `<script>` element.
pub fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

// ============================================================================
// URL Building
// ============================================================================

/// Build the public short URL `<origin>/go/<code>`.
///
/// With an empty origin the site-relative path `/go/<code>` is returned.
pub fn build_short_url(origin: &str, code: &str) -> String {
    format!("{}/go/{}", origin.trim_end_matches('/'), code)
}

/// Derive an origin from request data: `<scheme>://<host>`, or an empty
/// string when no host is known.
pub fn origin_from_host(host: Option<&str>, forwarded_proto: Option<&str>) -> String {
    match host.map(str::trim).filter(|h| !h.is_empty()) {
        Some(host) => {
            let scheme = match forwarded_proto.map(str::trim) {
                Some(p) if p.eq_ignore_ascii_case("https") => "https",
                _ => "http",
            };
            format!("{}://{}", scheme, host)
        }
        None => String::new(),
    }
}

// ============================================================================
// Time Utilities
// ============================================================================

/// Convert SystemTime to RFC3339 string (seconds precision, UTC).
pub fn system_time_to_rfc3339(t: SystemTime) -> String {
    let dt: DateTime<Utc> = t.into();
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_json_err() {
        assert_eq!(json_err("not_found"), serde_json::json!({"error": "not_found"}));
        assert_eq!(json_err("not_found").to_string(), r#"{"error":"not_found"}"#);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_js_string() {
        assert_eq!(js_string("https://e.com/?a=1"), r#""https://e.com/?a=1""#);
        assert_eq!(js_string(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(js_string("</script>"), r#""\u003c/script\u003e""#);
        assert_eq!(js_string("a&b"), r#""a\u0026b""#);
    }

    #[test]
    fn test_build_short_url() {
        assert_eq!(build_short_url("http://localhost:5000", "abc"), "http://localhost:5000/go/abc");
        assert_eq!(build_short_url("https://s.example/", "abc"), "https://s.example/go/abc");
        assert_eq!(build_short_url("", "abc"), "/go/abc");
    }

    #[test]
    fn test_origin_from_host() {
        assert_eq!(origin_from_host(Some("example.com"), None), "http://example.com");
        assert_eq!(origin_from_host(Some("example.com"), Some("HTTPS")), "https://example.com");
        assert_eq!(origin_from_host(Some("example.com"), Some("ftp")), "http://example.com");
        assert_eq!(origin_from_host(Some(" "), None), "");
        assert_eq!(origin_from_host(None, Some("https")), "");
    }

    #[test]
    fn test_system_time_to_rfc3339() {
        assert_eq!(system_time_to_rfc3339(UNIX_EPOCH), "1970-01-01T00:00:00Z");
        assert_eq!(
            system_time_to_rfc3339(UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
            "2023-11-14T22:13:20Z"
        );
    }
}
