//! Data-plane layer.
//!
//! Owns message movement: the per-channel forwarder loops that drain channel
//! queues and fan out to routed endpoints, the per-peer connection handlers
//! bridging transports to endpoints, and the periodic expiry sweep that
//! bounds how stale an undelivered endpoint item can get. No task in this
//! layer busy-polls; every loop suspends on a queue, a transport, or a timer.

pub(crate) mod connection;
pub(crate) mod expiry;
pub(crate) mod forwarder;
