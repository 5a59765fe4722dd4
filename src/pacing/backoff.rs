//! Per-host politeness pacing
//!
//! Each host carries two delays: a sticky delay fixed at first contact (the
//! larger of the configured base rate and the host's robots crawl-delay) and
//! an adaptive backoff that grows on throttle signals and decays on ordinary
//! outcomes. The effective delay before a request is the largest applicable
//! floor plus fresh jitter.

use rand::Rng;
use std::collections::HashMap;

/// Backoff floor applied on the first exponential trigger, in seconds.
const BACKOFF_FLOOR: f64 = 5.0;

/// Ceiling for exponential backoff growth, in seconds.
const BACKOFF_CAP: f64 = 120.0;

/// Adaptive pacing state for one host
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Current backoff in seconds; 0 when the host is healthy
    pub backoff_secs: f64,

    /// max(base rate, robots crawl-delay), fixed once learned
    pub sticky_delay_secs: f64,
}

/// Computes how long to wait before each request, per host.
pub struct PolitenessClock {
    base_delay: f64,
    jitter_max: f64,
    hosts: HashMap<String, HostState>,
    throttle_events: u64,
}

impl PolitenessClock {
    /// Creates a clock with a base inter-request delay and a jitter ceiling,
    /// both in seconds.
    pub fn new(base_delay: f64, jitter_max: f64) -> Self {
        Self {
            base_delay,
            jitter_max: jitter_max.max(0.0),
            hosts: HashMap::new(),
            throttle_events: 0,
        }
    }

    /// Computes the delay to observe before the next request to `host`.
    ///
    /// Takes the maximum of the base delay, the robots-advertised crawl
    /// delay, the host's sticky delay, and its current backoff, then adds
    /// uniform jitter in [0, jitter_max). The sticky delay is fixed on the
    /// host's first appearance and reused afterwards.
    pub fn effective_delay(&mut self, host: &str, robots_delay: f64) -> f64 {
        let base_delay = self.base_delay;
        let state = self
            .hosts
            .entry(host.to_string())
            .or_insert_with(|| HostState {
                backoff_secs: 0.0,
                sticky_delay_secs: base_delay.max(robots_delay),
            });

        let floor = self
            .base_delay
            .max(robots_delay)
            .max(state.sticky_delay_secs)
            .max(state.backoff_secs);

        floor + self.jitter()
    }

    fn jitter(&self) -> f64 {
        if self.jitter_max > 0.0 {
            rand::thread_rng().gen_range(0.0..self.jitter_max)
        } else {
            0.0
        }
    }

    /// Registers a throttle signal (HTTP 429/503) from `host`.
    ///
    /// With a Retry-After hint the backoff never drops below it; without
    /// one it doubles, flooring at 5s and capping at 120s.
    pub fn record_throttle(&mut self, host: &str, retry_after: Option<f64>) {
        self.throttle_events += 1;
        let state = self.hosts.entry(host.to_string()).or_default();

        state.backoff_secs = match retry_after {
            Some(hint) => state.backoff_secs.max(hint),
            None => (state.backoff_secs * 2.0).max(BACKOFF_FLOOR).min(BACKOFF_CAP),
        };

        tracing::warn!(
            "Throttled by {}, backoff now {:.1}s",
            host,
            state.backoff_secs
        );
    }

    /// Registers an ordinary (non-throttle) outcome from `host`, decaying
    /// its backoff toward zero.
    pub fn record_outcome(&mut self, host: &str) {
        if let Some(state) = self.hosts.get_mut(host) {
            state.backoff_secs = (state.backoff_secs * 0.5 - 1.0).max(0.0);
        }
    }

    /// Total throttle signals seen this run (diagnostic).
    pub fn throttle_events(&self) -> u64 {
        self.throttle_events
    }

    /// Current backoff for a host, 0 if unseen.
    pub fn backoff_for(&self, host: &str) -> f64 {
        self.hosts.get(host).map(|s| s.backoff_secs).unwrap_or(0.0)
    }
}
