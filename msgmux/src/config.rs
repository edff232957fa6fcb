//! Router tuning knobs.

use tokio::time::Duration;

/// Default bound for every channel and endpoint queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100_000;
/// Default cadence of the endpoint expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
/// Default maximum age of an undelivered endpoint item.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);

/// Configuration for a [`Router`](crate::Router).
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Bound for every channel and endpoint queue; insertion into a full
    /// queue evicts the oldest entries first.
    pub queue_capacity: usize,
    /// How often the expiry sweep visits endpoint queues.
    pub sweep_interval: Duration,
    /// Items older than this are evicted by the sweep without delivery.
    pub max_age: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}
