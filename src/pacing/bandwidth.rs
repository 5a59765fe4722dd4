//! Global bandwidth limiter
//!
//! A single shared token bucket caps aggregate download throughput. Every
//! byte actually transferred over the network is charged here: HTML bodies
//! and each streamed document chunk alike, so large binary downloads are
//! throttled identically to page fetches.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Longest single nap while waiting for refill, so shutdown stays responsive.
const MAX_NAP: Duration = Duration::from_secs(2);

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Byte-rate token bucket.
///
/// Capacity doubles as the refill rate: the bucket accumulates
/// `capacity` tokens per second up to at most `capacity` stored tokens.
/// A capacity of 0 means unlimited and bypasses all waiting.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Creates a bucket refilling at `bytes_per_sec`. The bucket starts full.
    pub fn new(bytes_per_sec: u64) -> Self {
        let capacity = bytes_per_sec as f64;
        Self {
            capacity,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Whether this bucket actually limits anything.
    pub fn is_unlimited(&self) -> bool {
        self.capacity <= 0.0
    }

    /// Charges `n_bytes` against the bucket, sleeping as needed to keep the
    /// average rate under capacity. Never fails; the caller always proceeds,
    /// only delayed.
    ///
    /// Charges larger than the capacity are drained across several refill
    /// naps, so `charge(n)` always returns after roughly `n / capacity`
    /// seconds when the bucket started empty. Stored tokens never go
    /// negative and never exceed capacity.
    pub async fn charge(&self, n_bytes: usize) {
        if self.is_unlimited() || n_bytes == 0 {
            return;
        }

        let mut need = n_bytes as f64;
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);

                let take = state.tokens.min(need);
                state.tokens -= take;
                need -= take;

                if need <= 0.0 {
                    return;
                }
                Duration::from_secs_f64(need / self.capacity).min(MAX_NAP)
            };
            tokio::time::sleep(wait).await;
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.last_refill = now;
        state.tokens = (state.tokens + elapsed * self.capacity).min(self.capacity);
    }
}
