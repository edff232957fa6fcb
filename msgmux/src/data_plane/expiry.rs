//! Periodic eviction of stale endpoint-queue items.

use crate::observability::events;
use crate::router::Router;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

const COMPONENT: &str = "expiry";

/// Process-wide sweep loop: every `sweep_interval`, drop from every endpoint
/// queue any item older than `max_age`, without delivering it.
///
/// Channel queues are not swept; a live forwarder drains them promptly, and
/// staleness only accumulates in endpoint queues whose peer is slow or away.
pub(crate) async fn run(router: Router, sweep_interval: Duration, max_age: Duration) {
    let mut ticker = interval(sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        for endpoint in router.endpoints_snapshot().await {
            let expired = endpoint.queue().evict_expired(max_age).await;
            if expired > 0 {
                debug!(
                    event = events::QUEUE_EVICT_EXPIRED,
                    component = COMPONENT,
                    endpoint = endpoint.name(),
                    expired,
                    "expired undelivered messages"
                );
            }
        }
    }
}
