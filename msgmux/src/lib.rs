/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! # msgmux
//!
//! `msgmux` is an in-process, dynamically reconfigurable publish/subscribe
//! message router. Independently connected named peers exchange [`Message`]
//! envelopes over named channels; peers subscribe and unsubscribe channels at
//! runtime through control messages on the reserved `"system"` channel, and
//! can correlate a future reply to a specific prior message uid. Peers are
//! isolated from each other by bounded per-peer delivery queues with
//! drop-oldest backpressure and message aging.
//!
//! The transport is an external collaborator: the router consumes
//! [`Transport`] / [`TransportListener`] trait objects and never touches
//! sockets or wire encodings itself (the `msgmux-server` binary supplies a
//! TCP implementation).
//!
//! ## Quick start (embedding)
//!
//! ```
//! use msgmux::{Message, Router, RouterConfig};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let router = Router::new(RouterConfig::default()).await;
//!
//! let orders = router.ensure_channel("orders").await;
//! let peer = router.ensure_endpoint("peer-a").await;
//! router.add_route(&orders, &peer).await;
//! assert_eq!(router.routes(&orders).await.len(), 1);
//!
//! router.publish(Message::new("orders", "new", json!({"qty": 3}))).await;
//!
//! router.shutdown().await;
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: [`Router`] and [`Server`]
//! - Control plane: route table, one-shot reply map, system-channel hook
//! - Data plane: per-channel forwarders, per-peer connection handlers,
//!   the periodic expiry sweep
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events and does not initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod channel;
pub use channel::Channel;

mod config;
pub use config::{
    RouterConfig, DEFAULT_MAX_AGE, DEFAULT_QUEUE_CAPACITY, DEFAULT_SWEEP_INTERVAL,
};

mod endpoint;
pub use endpoint::Endpoint;

mod message;
pub use message::Message;

mod queue;

mod router;
pub use router::Router;

mod server;
pub use server::Server;

mod transport;
pub use transport::{Transport, TransportError, TransportListener};

mod control_plane;
pub use control_plane::system::{
    SUBJECT_SUBSCRIBE_CHANNEL, SUBJECT_SUBSCRIBE_MESSAGE, SUBJECT_UNSUBSCRIBE_CHANNEL,
    SYSTEM_CHANNEL,
};

mod data_plane;

#[doc(hidden)]
pub mod observability;
