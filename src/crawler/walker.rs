//! Frontier walker
//!
//! Breadth-first traversal of one seed's site. The frontier and visited set
//! live only for the duration of a cycle and are rebuilt from the seed on
//! the next one; throttled entries jump back to the front of the queue so
//! retries happen before the rest of the depth level.

use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

use crate::archive::Archive;
use crate::config::Config;
use crate::crawler::fetcher::{fetch_page, FetchOutcome};
use crate::crawler::parser::parse_html;
use crate::crawler::processor::{archive_page, process_documents};
use crate::crawler::scheduler::Shutdown;
use crate::pacing::{ActiveWindow, PolitenessClock, TokenBucket};
use crate::robots::RobotsAuthority;
use crate::url::in_scope;

/// Minimum nap while waiting for the active window to open, seconds.
const WINDOW_POLL_FLOOR: u64 = 60;

/// One queued fetch
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// Counters for one seed's traversal
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub pages_archived: u64,
    pub documents_archived: u64,
    pub pages_failed: u64,
    pub requeued: u64,
}

/// Borrowed crawl context for one cycle. The owner (the cycle runner) keeps
/// politeness and robots state alive across seeds so hosts shared between
/// seeds stay paced.
pub struct Walker<'a> {
    pub client: &'a Client,
    pub robots: &'a mut RobotsAuthority,
    pub clock: &'a mut PolitenessClock,
    pub bucket: &'a TokenBucket,
    pub window: &'a ActiveWindow,
    pub archive: &'a Archive,
    pub config: &'a Config,
    pub shutdown: &'a Shutdown,
}

impl Walker<'_> {
    /// Crawls one seed breadth-first until the frontier drains or shutdown
    /// is requested.
    pub async fn crawl_seed(&mut self, seed: &Url) -> CrawlStats {
        let mut stats = CrawlStats::default();
        let Some(seed_host) = seed.host_str().map(str::to_string) else {
            tracing::error!("Seed {} has no host, skipping", seed);
            return stats;
        };

        let mut frontier: VecDeque<FrontierEntry> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut seen_documents: HashSet<String> = HashSet::new();

        visited.insert(seed.to_string());
        frontier.push_back(FrontierEntry {
            url: seed.clone(),
            depth: 0,
        });

        while let Some(entry) = frontier.pop_front() {
            if self.shutdown.is_triggered() {
                tracing::info!("Shutdown requested, abandoning seed {}", seed_host);
                break;
            }
            if !self.wait_for_window().await {
                break;
            }

            if !self.robots.is_allowed(&entry.url).await {
                tracing::debug!("Robots disallows {}", entry.url);
                continue;
            }

            let host = entry.url.host_str().unwrap_or(&seed_host).to_string();
            let robots_delay = self.robots.crawl_delay(&entry.url).await;
            let delay = self.clock.effective_delay(&host, robots_delay);
            if !self.shutdown.sleep(Duration::from_secs_f64(delay)).await {
                break;
            }

            tracing::debug!("Fetching {} (depth {})", entry.url, entry.depth);
            match fetch_page(self.client, &entry.url).await {
                FetchOutcome::Html { final_url, body } => {
                    self.bucket.charge(body.len()).await;
                    self.clock.record_outcome(&host);

                    let parsed = parse_html(&body, &final_url);
                    match archive_page(self.archive, &entry.url, &body, &parsed) {
                        Ok(()) => stats.pages_archived += 1,
                        Err(e) => {
                            stats.pages_failed += 1;
                            tracing::error!("Failed to archive {}: {}", entry.url, e);
                        }
                    }

                    if self.config.download_files && !parsed.document_links.is_empty() {
                        stats.documents_archived += process_documents(
                            self.client,
                            self.bucket,
                            self.robots,
                            self.archive,
                            &parsed.document_links,
                            &mut seen_documents,
                        )
                        .await as u64;
                    }

                    // The depth-limit page itself is fully processed; only
                    // its children stay out of the frontier.
                    if entry.depth < self.config.max_depth {
                        for link in &parsed.links {
                            if self.admit(link, &seed_host, &visited).await {
                                visited.insert(link.to_string());
                                frontier.push_back(FrontierEntry {
                                    url: link.clone(),
                                    depth: entry.depth + 1,
                                });
                            }
                        }
                    }
                }
                FetchOutcome::Throttled { retry_after } => {
                    self.clock.record_throttle(&host, retry_after);
                    stats.requeued += 1;
                    frontier.push_front(entry);
                }
                FetchOutcome::NotHtml { content_type } => {
                    self.clock.record_outcome(&host);
                    tracing::info!("Dropping non-HTML {} ({})", entry.url, content_type);
                }
                FetchOutcome::HttpError { status } => {
                    self.clock.record_outcome(&host);
                    stats.pages_failed += 1;
                    tracing::warn!("HTTP {} for {}", status, entry.url);
                }
                FetchOutcome::NetworkError { error } => {
                    self.clock.record_outcome(&host);
                    stats.pages_failed += 1;
                    tracing::warn!("Network error for {}: {}", entry.url, error);
                }
            }
        }

        stats
    }

    /// Admission check for a discovered link. All must hold: in scope for
    /// the seed host, not already visited, allowed by robots.
    async fn admit(&mut self, link: &Url, seed_host: &str, visited: &HashSet<String>) -> bool {
        if visited.contains(link.as_str()) {
            return false;
        }
        if !in_scope(
            link,
            seed_host,
            &self.config.include_patterns,
            &self.config.exclude_patterns,
        ) {
            return false;
        }
        self.robots.is_allowed(link).await
    }

    /// Blocks until the active window opens. Returns false on shutdown.
    async fn wait_for_window(&self) -> bool {
        loop {
            if self.window.is_active() {
                return true;
            }
            let wait = self.window.seconds_until_next_window().max(WINDOW_POLL_FLOOR);
            tracing::info!(
                "Outside active window {}, sleeping {}s",
                self.window.describe(),
                wait
            );
            if !self.shutdown.sleep(Duration::from_secs(wait)).await {
                return false;
            }
        }
    }
}
