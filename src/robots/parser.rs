//! Robots.txt rule matching
//!
//! Allow/deny decisions are delegated to the robotstxt crate. Crawl-delay is
//! parsed by hand since the crate does not expose it: an agent-specific
//! directive wins over a wildcard one.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt rules for one domain
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Checks whether a URL is allowed for the given user agent.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Extracts the crawl delay for a user agent, in seconds.
    ///
    /// Preference order: a delay inside a group naming this agent, else a
    /// delay inside a wildcard group, else None. Group membership follows the
    /// robots.txt convention that consecutive User-agent lines share the
    /// directives that follow them.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let agent = user_agent.to_lowercase();

        let mut group: Vec<String> = Vec::new();
        let mut group_closed = false;
        let mut wildcard_delay: Option<f64> = None;
        let mut agent_delay: Option<f64> = None;

        for line in self.content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // A User-agent line after other directives starts a new group
                    if group_closed {
                        group.clear();
                        group_closed = false;
                    }
                    group.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    group_closed = true;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if group.iter().any(|g| g != "*" && agent.contains(g.as_str())) {
                        agent_delay = Some(delay);
                    } else if group.iter().any(|g| g == "*") {
                        wildcard_delay = Some(delay);
                    }
                }
                _ => {
                    group_closed = true;
                }
            }
        }

        agent_delay.or(wildcard_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allows_all() {
        let robots = ParsedRobots::from_content("");
        assert!(robots.is_allowed("https://example.edu/any", "sitevault"));
    }

    #[test]
    fn test_disallow_all() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /");
        assert!(!robots.is_allowed("https://example.edu/page", "sitevault"));
    }

    #[test]
    fn test_disallow_prefix() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert!(robots.is_allowed("https://example.edu/page", "sitevault"));
        assert!(!robots.is_allowed("https://example.edu/admin/users", "sitevault"));
    }

    #[test]
    fn test_specific_agent_rules() {
        let content = "User-agent: badbot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("https://example.edu/page", "sitevault"));
        assert!(!robots.is_allowed("https://example.edu/page", "badbot"));
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 10");
        assert_eq!(robots.crawl_delay("sitevault"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_agent_over_wildcard() {
        let content = "User-agent: sitevault\nCrawl-delay: 5\n\nUser-agent: *\nCrawl-delay: 10";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("sitevault/0.3"), Some(5.0));
        assert_eq!(robots.crawl_delay("otherbot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_none() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("sitevault"), None);
    }

    #[test]
    fn test_crawl_delay_decimal() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 2.5");
        assert_eq!(robots.crawl_delay("sitevault"), Some(2.5));
    }

    #[test]
    fn test_crawl_delay_shared_group() {
        let content = "User-agent: bota\nUser-agent: botb\nCrawl-delay: 3";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(robots.crawl_delay("bota"), Some(3.0));
        assert_eq!(robots.crawl_delay("botb"), Some(3.0));
        assert_eq!(robots.crawl_delay("botc"), None);
    }

    #[test]
    fn test_crawl_delay_case_insensitive() {
        let robots = ParsedRobots::from_content("User-agent: SiteVault\ncrawl-delay: 7");
        assert_eq!(robots.crawl_delay("sitevault"), Some(7.0));
    }

    #[test]
    fn test_garbage_content_is_permissive() {
        let robots = ParsedRobots::from_content("this is not robots.txt {{{");
        assert!(robots.is_allowed("https://example.edu/any", "sitevault"));
        assert_eq!(robots.crawl_delay("sitevault"), None);
    }
}
