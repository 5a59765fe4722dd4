//! Request pacing: per-host politeness delays, global bandwidth shaping,
//! and active-hours scheduling.

mod backoff;
mod bandwidth;
mod window;

pub use backoff::{HostState, PolitenessClock};
pub use bandwidth::TokenBucket;
pub use window::ActiveWindow;
