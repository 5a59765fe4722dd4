use crate::UrlError;
use url::Url;

/// Normalizes a URL for frontier identity.
///
/// Normalization is deliberately minimal: the visited set uses URL identity,
/// not content identity, so the only transformations are the ones that make
/// two spellings of the same fetch target compare equal.
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after `#`)
///
/// The host is lowercased by the `url` crate during parsing, so the result is
/// idempotent: normalizing an already-normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use sitevault::url::normalize_url;
///
/// let url = normalize_url("https://example.edu/page#section").unwrap();
/// assert_eq!(url.as_str(), "https://example.edu/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Resolves a possibly-relative href against a base page URL and normalizes
/// the result. Returns None for unresolvable or non-HTTP(S) targets.
pub fn resolve_and_normalize(href: &str, base: &Url) -> Option<Url> {
    let joined = base.join(href.trim()).ok()?;
    normalize_url(joined.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fragment() {
        let result = normalize_url("https://example.edu/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.edu/page");
    }

    #[test]
    fn test_no_fragment_unchanged() {
        let result = normalize_url("https://example.edu/page?q=1").unwrap();
        assert_eq!(result.as_str(), "https://example.edu/page?q=1");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_url("https://Example.EDU/Page#frag").unwrap();
        let twice = normalize_url(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lowercase_host() {
        let result = normalize_url("https://EXAMPLE.EDU/Page").unwrap();
        assert_eq!(result.host_str(), Some("example.edu"));
        // Path case is preserved
        assert_eq!(result.path(), "/Page");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.edu/file");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed() {
        assert!(normalize_url("not a url").is_err());
    }

    #[test]
    fn test_resolve_relative() {
        let base = Url::parse("https://example.edu/docs/index.html").unwrap();
        let resolved = resolve_and_normalize("report.pdf", &base).unwrap();
        assert_eq!(resolved.as_str(), "https://example.edu/docs/report.pdf");
    }

    #[test]
    fn test_resolve_rejects_mailto() {
        let base = Url::parse("https://example.edu/").unwrap();
        assert!(resolve_and_normalize("mailto:admin@example.edu", &base).is_none());
    }

    #[test]
    fn test_resolve_strips_fragment() {
        let base = Url::parse("https://example.edu/a/").unwrap();
        let resolved = resolve_and_normalize("/b#sec", &base).unwrap();
        assert_eq!(resolved.as_str(), "https://example.edu/b");
    }
}
