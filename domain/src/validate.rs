//! Validation of submitted target URLs and path codes.

use url::Url;

use crate::Code;
use crate::CoreError;

/// Longest target URL accepted, in bytes after trimming.
pub const MAX_URL_LEN: usize = 2048;

/// Validate a submitted target URL: it must parse as an absolute URL with an
/// http/https scheme and a non-empty host. Surrounding whitespace is ignored;
/// the returned string is the trimmed input, byte-for-byte.
pub fn validate_target_url(s: &str) -> Result<String, CoreError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidUrl("empty".into()));
    }
    if trimmed.len() > MAX_URL_LEN {
        return Err(CoreError::InvalidUrl("too long".into()));
    }
    let parsed = Url::parse(trimmed).map_err(|e| CoreError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoreError::InvalidUrl(format!(
            "scheme '{}' is not allowed",
            parsed.scheme()
        )));
    }
    // `http:example.com` parses with a host but browsers resolve it relative
    // to the current page; the authority must be spelled out.
    let after_scheme = trimmed.get(parsed.scheme().len() + 1..).unwrap_or("");
    if !after_scheme.starts_with("//") {
        return Err(CoreError::InvalidUrl("missing '//' after scheme".into()));
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(CoreError::InvalidUrl("missing host".into())),
    }
}

/// Parse a code taken from a request path.
pub fn parse_code(s: &str) -> Result<Code, CoreError> {
    Code::new(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert_eq!(
            validate_target_url("https://example.com").unwrap(),
            "https://example.com"
        );
        assert!(validate_target_url("http://example.com/a?b=c#d").is_ok());
        assert!(validate_target_url("http://localhost:8080").is_ok());
        assert_eq!(
            validate_target_url("HTTPS://Example.com").unwrap(),
            "HTTPS://Example.com"
        );
    }

    #[test]
    fn trims_but_keeps_the_rest_verbatim() {
        assert_eq!(
            validate_target_url("  https://Example.com/Path?q=%20 \n").unwrap(),
            "https://Example.com/Path?q=%20"
        );
    }

    #[test]
    fn rejects_bad_input() {
        for bad in [
            "",
            "   ",
            "not-a-url",
            "example.com",
            "ftp://example.com",
            "javascript:alert(1)",
            "mailto:a@b.c",
            "http://",
            "http:example.com",
            "https:example.com/path",
            "http:/example.com",
        ] {
            assert!(
                matches!(validate_target_url(bad), Err(CoreError::InvalidUrl(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overlong_url() {
        let at_limit = format!("https://e.com/{}", "a".repeat(MAX_URL_LEN - 14));
        assert_eq!(at_limit.len(), MAX_URL_LEN);
        assert!(validate_target_url(&at_limit).is_ok());
        let over = format!("{at_limit}a");
        assert!(matches!(validate_target_url(&over), Err(CoreError::InvalidUrl(_))));
    }

    #[test]
    fn parse_code_delegates() {
        assert!(parse_code("abc123").is_ok());
        assert!(parse_code("").is_err());
        assert!(parse_code("bad.char").is_err());
    }
}
