/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Per-peer connection handler bridging a transport to the router.

use crate::endpoint::Endpoint;
use crate::observability::events;
use crate::queue::QueuedItem;
use crate::router::Router;
use crate::transport::{Transport, TransportError};
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "connection";

/// Runs one peer's ingress/egress loop pair until either side fails.
///
/// The endpoint for `peer` is created on first connect and survives this
/// handler: a reconnecting peer with the same name resumes draining the same
/// queue. Termination of one loop cancels the sibling (the `select!` drops
/// it) and the transport is closed; nothing else in the router is affected.
pub(crate) async fn handle(router: Router, peer: String, transport: Arc<dyn Transport>) {
    let endpoint = router.ensure_endpoint(&peer).await;

    info!(
        event = events::PEER_CONNECTED,
        component = COMPONENT,
        peer = peer.as_str(),
        "peer connected"
    );

    let (side, result) = tokio::select! {
        res = ingress_loop(&router, transport.as_ref()) => ("ingress", res),
        res = egress_loop(&endpoint, transport.as_ref()) => ("egress", res),
    };
    transport.close().await;

    let err = match result {
        Ok(never) => match never {},
        Err(err) => err,
    };
    match err {
        TransportError::Closed => {
            info!(
                event = events::PEER_DISCONNECTED,
                component = COMPONENT,
                peer = peer.as_str(),
                side,
                "peer disconnected"
            );
        }
        err => {
            warn!(
                event = events::PEER_DISCONNECTED,
                component = COMPONENT,
                peer = peer.as_str(),
                side,
                err = %err,
                "peer connection failed"
            );
        }
    }
}

/// Receives from the wire and enqueues into the named channel, creating the
/// channel (and its forwarder) on first reference.
async fn ingress_loop(
    router: &Router,
    transport: &dyn Transport,
) -> Result<std::convert::Infallible, TransportError> {
    loop {
        let msg = transport.recv().await?;
        let channel = router.ensure_channel(&msg.channel).await;
        let msg_id = msg.uid;
        let evicted = channel.queue().push(QueuedItem::new(msg)).await;
        if evicted > 0 {
            warn!(
                event = events::QUEUE_EVICT_OLDEST,
                component = COMPONENT,
                channel = channel.name(),
                evicted,
                "channel queue full, dropped oldest"
            );
        }
        debug!(
            event = events::INGRESS_QUEUED,
            component = COMPONENT,
            channel = channel.name(),
            msg_id = %msg_id,
            "queued inbound message"
        );
    }
}

/// Drains the peer's endpoint queue onto the wire.
async fn egress_loop(
    endpoint: &Endpoint,
    transport: &dyn Transport,
) -> Result<std::convert::Infallible, TransportError> {
    loop {
        let item = endpoint.queue().pop().await;
        transport.send(&item.msg).await?;
    }
}
