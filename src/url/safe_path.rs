use sha2::{Digest, Sha256};
use url::Url;

/// Length of the hash suffix appended to archive file names.
const HASH_CHARS: usize = 10;

/// Derives a filesystem-safe identifier for a URL.
///
/// The identifier is the URL path with separators flattened to underscores,
/// followed by a short hash of the full URL. The hash makes the name
/// collision-resistant (two URLs with the same flattened path but different
/// query strings or hosts get distinct names) while the path part keeps the
/// archive browsable. Deterministic and stable across runs for the same URL.
pub fn safe_path_for(url: &Url) -> String {
    let base = url.path().trim_end_matches('/');

    let mut name: String = base
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == ':' { '_' } else { c })
        .collect();
    name = name.trim_start_matches('_').to_string();
    if name.is_empty() {
        name = "index".to_string();
    }

    let digest = Sha256::digest(url.as_str().as_bytes());
    let short = &hex::encode(digest)[..HASH_CHARS];

    format!("{}-{}", name, short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let u = url("https://example.edu/a/b.pdf");
        assert_eq!(safe_path_for(&u), safe_path_for(&u));
    }

    #[test]
    fn test_root_is_index() {
        let name = safe_path_for(&url("https://example.edu/"));
        assert!(name.starts_with("index-"), "got {}", name);
    }

    #[test]
    fn test_path_flattened() {
        let name = safe_path_for(&url("https://example.edu/docs/report.pdf"));
        assert!(name.starts_with("docs_report.pdf-"), "got {}", name);
    }

    #[test]
    fn test_distinct_for_distinct_urls() {
        // Same path on different hosts must not collide
        let a = safe_path_for(&url("https://a.example.edu/x"));
        let b = safe_path_for(&url("https://b.example.edu/x"));
        assert_ne!(a, b);

        // Same path with different query must not collide
        let c = safe_path_for(&url("https://example.edu/x?page=1"));
        let d = safe_path_for(&url("https://example.edu/x?page=2"));
        assert_ne!(c, d);
    }

    #[test]
    fn test_no_path_separators_in_name() {
        let name = safe_path_for(&url("https://example.edu/a/b/c"));
        assert!(!name.contains('/'));
    }
}
