//! Robots.txt authority
//!
//! Per-domain robots.txt fetch, cache, and decision oracle. Entries are
//! populated lazily on the first query for a domain and never expire within
//! a process run. A fetch or parse failure degrades to a permissive entry
//! (allow all, no crawl delay); it is logged once and never surfaces to the
//! caller.

mod parser;

pub use parser::ParsedRobots;

use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Cached robots decision data for one domain
#[derive(Debug, Clone)]
pub struct RobotsEntry {
    /// Parsed rules; None means the fetch failed and everything is allowed
    pub rules: Option<ParsedRobots>,

    /// Crawl delay in seconds advertised for our agent (0 when absent)
    pub crawl_delay: f64,
}

impl RobotsEntry {
    fn permissive() -> Self {
        Self {
            rules: None,
            crawl_delay: 0.0,
        }
    }
}

/// Per-domain robots.txt oracle, owned by the crawl for one process run.
pub struct RobotsAuthority {
    client: Client,
    user_agent: String,
    respect: bool,
    cache: HashMap<String, RobotsEntry>,
}

impl RobotsAuthority {
    /// Creates a new authority.
    ///
    /// When `respect` is false every query is answered permissively without
    /// any network access.
    pub fn new(client: Client, user_agent: impl Into<String>, respect: bool) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            respect,
            cache: HashMap::new(),
        }
    }

    /// Checks whether fetching this URL is permitted.
    pub async fn is_allowed(&mut self, url: &Url) -> bool {
        if !self.respect {
            return true;
        }
        let domain = self.ensure_cached(url).await;
        match self.cache.get(&domain).and_then(|e| e.rules.as_ref()) {
            Some(rules) => rules.is_allowed(url.as_str(), &self.user_agent),
            None => true,
        }
    }

    /// Returns the crawl delay advertised for this URL's domain, in seconds.
    pub async fn crawl_delay(&mut self, url: &Url) -> f64 {
        if !self.respect {
            return 0.0;
        }
        let domain = self.ensure_cached(url).await;
        self.cache.get(&domain).map(|e| e.crawl_delay).unwrap_or(0.0)
    }

    /// Number of domains with cached entries (diagnostic).
    pub fn cached_domains(&self) -> usize {
        self.cache.len()
    }

    /// Populates the cache entry for this URL's domain if absent, returning
    /// the domain key.
    async fn ensure_cached(&mut self, url: &Url) -> String {
        let domain = url.host_str().unwrap_or_default().to_string();
        if !self.cache.contains_key(&domain) {
            let entry = self.fetch_entry(url, &domain).await;
            self.cache.insert(domain.clone(), entry);
        }
        domain
    }

    async fn fetch_entry(&self, url: &Url, domain: &str) -> RobotsEntry {
        let robots_url = format!("{}://{}/robots.txt", url.scheme(), domain);

        let body = match self.client.get(&robots_url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Robots read failed for {}: {}", domain, e);
                    return RobotsEntry::permissive();
                }
            },
            Ok(resp) => {
                tracing::warn!(
                    "Robots fetch for {} returned HTTP {}, treating as allow-all",
                    domain,
                    resp.status()
                );
                return RobotsEntry::permissive();
            }
            Err(e) => {
                tracing::warn!("Robots fetch failed for {}: {}", domain, e);
                return RobotsEntry::permissive();
            }
        };

        let rules = ParsedRobots::from_content(&body);
        let crawl_delay = rules.crawl_delay(&self.user_agent).unwrap_or(0.0);
        tracing::info!("Robots fetched for {} (crawl-delay={})", domain, crawl_delay);

        RobotsEntry {
            rules: Some(rules),
            crawl_delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client() -> Client {
        Client::builder().build().unwrap()
    }

    #[tokio::test]
    async fn test_disabled_respect_never_fetches() {
        // No mock server at all: any network access would error, and a
        // disabled authority must not even try.
        let mut authority = RobotsAuthority::new(test_client(), "sitevault", false);
        let url = Url::parse("http://127.0.0.1:9/page").unwrap();
        assert!(authority.is_allowed(&url).await);
        assert_eq!(authority.crawl_delay(&url).await, 0.0);
        assert_eq!(authority.cached_domains(), 0);
    }

    #[tokio::test]
    async fn test_fetch_and_decide() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "User-agent: *\nDisallow: /private\nCrawl-delay: 2",
            ))
            .expect(1) // cached after first query
            .mount(&server)
            .await;

        let mut authority = RobotsAuthority::new(test_client(), "sitevault", true);
        let allowed = Url::parse(&format!("{}/public", server.uri())).unwrap();
        let denied = Url::parse(&format!("{}/private/x", server.uri())).unwrap();

        assert!(authority.is_allowed(&allowed).await);
        assert!(!authority.is_allowed(&denied).await);
        assert_eq!(authority.crawl_delay(&allowed).await, 2.0);
        assert_eq!(authority.cached_domains(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_permissive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut authority = RobotsAuthority::new(test_client(), "sitevault", true);
        let url = Url::parse(&format!("{}/anything", server.uri())).unwrap();
        assert!(authority.is_allowed(&url).await);
        assert_eq!(authority.crawl_delay(&url).await, 0.0);
    }
}
