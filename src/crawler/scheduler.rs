//! Run scheduling and shutdown plumbing
//!
//! The cycle runner owns the long-lived crawl state (HTTP client, robots
//! cache, politeness clock, bandwidth bucket, archive handle) and drives
//! seeds through the walker. The outer loop runs one cycle immediately,
//! then either exits (run-once) or sleeps the schedule interval between
//! cycles until shutdown.

use reqwest::Client;
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

use crate::archive::Archive;
use crate::config::{Config, EnvSettings};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::walker::Walker;
use crate::pacing::{ActiveWindow, PolitenessClock, TokenBucket};
use crate::robots::RobotsAuthority;
use crate::url::normalize_url;
use crate::Result;

/// Cancellation signal shared by every sleep point in the crawl.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Creates a shutdown signal pair. Send `true` (or drop the sender) to stop.
pub fn shutdown_channel() -> (watch::Sender<bool>, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (tx, Shutdown { rx })
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleeps for `duration`, returning false if shutdown arrived first.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        let mut rx = self.rx.clone();
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            changed = rx.changed() => match changed {
                Ok(()) => !*rx.borrow(),
                // Sender dropped: treat as shutdown
                Err(_) => false,
            },
        }
    }
}

/// Owns crawl state across cycles and runs the schedule loop.
pub struct CycleRunner {
    config: Config,
    settings: EnvSettings,
    client: Client,
    archive: Archive,
    robots: RobotsAuthority,
    clock: PolitenessClock,
    bucket: TokenBucket,
    window: ActiveWindow,
    shutdown: Shutdown,
}

impl CycleRunner {
    pub fn new(config: Config, settings: EnvSettings, shutdown: Shutdown) -> Result<Self> {
        let client = build_http_client(&settings.user_agent)?;
        let archive = Archive::open(&config.output_dir)?;
        let robots = RobotsAuthority::new(
            client.clone(),
            settings.user_agent.clone(),
            settings.respect_robots,
        );
        let clock = PolitenessClock::new(config.rate_limit, settings.jitter_max);
        let bucket = TokenBucket::new(settings.bandwidth_bps);
        let window = ActiveWindow::parse(&settings.active_window, &settings.window_tz);

        tracing::info!(
            "Crawler ready: {} seed(s), depth {}, window {}, bandwidth {}",
            config.seed_urls.len(),
            config.max_depth,
            window.describe(),
            if settings.bandwidth_bps == 0 {
                "unlimited".to_string()
            } else {
                format!("{} B/s", settings.bandwidth_bps)
            }
        );

        Ok(Self {
            config,
            settings,
            client,
            archive,
            robots,
            clock,
            bucket,
            window,
            shutdown,
        })
    }

    /// Runs one crawl cycle: every seed in order, then the metadata.json
    /// rebuild. A seed failing never stops the seeds after it.
    pub async fn run_cycle(&mut self) -> Result<()> {
        let seeds: Vec<Url> = self
            .config
            .seed_urls
            .iter()
            .filter_map(|s| match normalize_url(s) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::error!("Skipping seed {}: {}", s, e);
                    None
                }
            })
            .collect();

        for seed in &seeds {
            if self.shutdown.is_triggered() {
                break;
            }
            tracing::info!("Crawling seed {}", seed);
            let mut walker = Walker {
                client: &self.client,
                robots: &mut self.robots,
                clock: &mut self.clock,
                bucket: &self.bucket,
                window: &self.window,
                archive: &self.archive,
                config: &self.config,
                shutdown: &self.shutdown,
            };
            let stats = walker.crawl_seed(seed).await;
            tracing::info!(
                "Seed {} done: {} pages, {} documents, {} failures, {} requeues",
                seed,
                stats.pages_archived,
                stats.documents_archived,
                stats.pages_failed,
                stats.requeued
            );
        }

        let count = self.archive.rebuild_metadata_json()?;
        tracing::info!(
            "Cycle complete: {} records in archive, {} throttle signals so far",
            count,
            self.clock.throttle_events()
        );
        Ok(())
    }

    /// Runs the full schedule: one immediate cycle, then either exit
    /// (run-once) or loop with the configured interval between cycles.
    pub async fn run(&mut self) -> Result<()> {
        self.run_cycle().await?;

        if self.settings.run_once {
            tracing::info!("Run-once mode, exiting after first cycle");
            return Ok(());
        }

        let interval = Duration::from_secs(self.settings.schedule_hours * 3600);
        loop {
            if self.shutdown.is_triggered() {
                break;
            }
            tracing::info!(
                "Next cycle in {} hour(s)",
                self.settings.schedule_hours
            );
            if !self.shutdown.sleep(interval).await {
                break;
            }
            if let Err(e) = self.run_cycle().await {
                tracing::error!("Cycle failed: {}", e);
            }
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
