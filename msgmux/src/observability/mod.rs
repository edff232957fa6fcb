//! Observability helpers.
//!
//! The library emits `tracing` events with canonical structured field values
//! and never installs a global subscriber; binaries and tests own one-time
//! subscriber initialization at process boundaries.

pub mod events;
