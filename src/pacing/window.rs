//! Active-hours scheduling
//!
//! Crawling can be confined to wall-clock windows in a named timezone, e.g.
//! "22:00-06:00,12:00-13:00". Windows that cross midnight wrap around.
//! An empty or fully-unparseable spec means always active.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// One window as minutes past midnight. start > end means overnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    start: u32,
    end: u32,
}

impl Window {
    fn contains(&self, minute: u32) -> bool {
        if self.start <= self.end {
            minute >= self.start && minute <= self.end
        } else {
            minute >= self.start || minute <= self.end
        }
    }
}

/// Wall-clock schedule restricting when the walker may run.
#[derive(Debug, Clone)]
pub struct ActiveWindow {
    windows: Vec<Window>,
    tz: Tz,
}

impl ActiveWindow {
    /// Parses a window spec like "09:00-17:00,22:30-01:00" in a named
    /// timezone. Malformed parts are logged and skipped; an unknown timezone
    /// falls back to UTC with a warning. An empty spec yields a schedule
    /// that is always active.
    pub fn parse(spec: &str, tz_name: &str) -> Self {
        let tz: Tz = match tz_name.parse() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!("Unknown timezone '{}', using UTC", tz_name);
                Tz::UTC
            }
        };

        let mut windows = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match Self::parse_window(part) {
                Some(w) => windows.push(w),
                None => tracing::warn!("Skipping malformed active window '{}'", part),
            }
        }

        Self { windows, tz }
    }

    /// Schedule with no restrictions.
    pub fn always() -> Self {
        Self {
            windows: Vec::new(),
            tz: Tz::UTC,
        }
    }

    fn parse_window(part: &str) -> Option<Window> {
        let (start, end) = part.split_once('-')?;
        Some(Window {
            start: Self::parse_minute(start.trim())?,
            end: Self::parse_minute(end.trim())?,
        })
    }

    fn parse_minute(hhmm: &str) -> Option<u32> {
        let (h, m) = hhmm.split_once(':')?;
        let h: u32 = h.parse().ok()?;
        let m: u32 = m.parse().ok()?;
        if h >= 24 || m >= 60 {
            return None;
        }
        Some(h * 60 + m)
    }

    /// Whether crawling is permitted right now.
    pub fn is_active(&self) -> bool {
        self.is_active_at(self.now())
    }

    /// Whether crawling is permitted at the given instant.
    pub fn is_active_at(&self, now: DateTime<Tz>) -> bool {
        self.is_active_at_minute(now.hour() * 60 + now.minute())
    }

    /// Seconds until the next window opens; 0 when already active.
    pub fn seconds_until_next_window(&self) -> u64 {
        self.seconds_until_next_window_at(self.now())
    }

    /// Seconds from the given instant until the next window opens; 0 when
    /// that instant is already inside a window (or none are configured).
    pub fn seconds_until_next_window_at(&self, now: DateTime<Tz>) -> u64 {
        let minute = now.hour() * 60 + now.minute();
        if self.is_active_at_minute(minute) {
            return 0;
        }

        let mut best = u32::MAX;
        for w in &self.windows {
            let until = (w.start + MINUTES_PER_DAY - minute) % MINUTES_PER_DAY;
            best = best.min(until);
        }
        if best == u32::MAX {
            return 0;
        }

        // Land at the top of the opening minute
        (best as u64 * 60).saturating_sub(now.second() as u64)
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    fn is_active_at_minute(&self, minute: u32) -> bool {
        if self.windows.is_empty() {
            return true;
        }
        self.windows.iter().any(|w| w.contains(minute))
    }

    /// Human-readable description for startup logging.
    pub fn describe(&self) -> String {
        if self.windows.is_empty() {
            return "always".to_string();
        }
        let parts: Vec<String> = self
            .windows
            .iter()
            .map(|w| {
                format!(
                    "{:02}:{:02}-{:02}:{:02}",
                    w.start / 60,
                    w.start % 60,
                    w.end / 60,
                    w.end % 60
                )
            })
            .collect();
        format!("{} ({})", parts.join(","), self.tz)
    }
}
