use url::Url;

/// Checks whether a discovered link falls inside the crawl scope for a seed.
///
/// A URL is in scope when all of the following hold:
/// - the scheme is HTTP or HTTPS
/// - the host equals the seed's host exactly (cross-domain links are never
///   followed, subdomains included)
/// - if any include patterns are configured, the path contains at least one
/// - the path contains none of the exclude patterns
///
/// Patterns are plain path substrings, not globs. Robots permission and
/// visited-set membership are checked separately by the walker.
pub fn in_scope(url: &Url, seed_host: &str, include: &[String], exclude: &[String]) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    match url.host_str() {
        Some(host) if host == seed_host => {}
        _ => return false,
    }

    let path = url.path();

    if !include.is_empty() && !include.iter().any(|p| path.contains(p.as_str())) {
        return false;
    }

    if exclude.iter().any(|p| path.contains(p.as_str())) {
        return false;
    }

    true
}
