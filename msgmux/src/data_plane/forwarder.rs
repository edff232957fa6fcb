/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Per-channel forwarder loop: drain, hook, fan out.

use crate::channel::Channel;
use crate::control_plane::system::SystemControl;
use crate::message::Message;
use crate::observability::events;
use crate::queue::QueuedItem;
use crate::router::Router;
use tracing::{debug, warn};

const COMPONENT: &str = "forwarder";

/// Behavior attached to a channel's forwarder, dispatched as a closed
/// variant rather than an opaque callback so the loop's state machine stays
/// statically checkable. The system control plane is the only hook today.
pub(crate) enum ChannelHook {
    None,
    System(SystemControl),
}

impl ChannelHook {
    /// Lets the hook observe one message and decide whether to forward it.
    /// Hooks are fail-open by construction: no hook outcome can stall the
    /// channel.
    async fn apply(&self, msg: &Message) -> bool {
        match self {
            ChannelHook::None => true,
            ChannelHook::System(control) => control.on_message(msg).await,
        }
    }
}

/// Drains one channel forever, until the owning router aborts the task.
///
/// Destination set per message: the route-table snapshot for this channel,
/// plus the reply-map endpoint when the message references a subscribed uid.
/// The set is deduplicated by endpoint name; each destination receives its
/// own copy with a fresh enqueue timestamp.
pub(crate) async fn run(router: Router, channel: Channel, hook: ChannelHook) {
    debug!(
        event = events::FORWARDER_START,
        component = COMPONENT,
        channel = channel.name(),
        "forwarder started"
    );

    loop {
        let item = channel.queue().pop().await;

        if !hook.apply(&item.msg).await {
            continue;
        }

        let mut dests = router.routes_by_name(channel.name()).await;
        if let Some(reference) = item.msg.reference {
            if let Some(endpoint) = router.take_reply(&reference).await {
                debug!(
                    event = events::FORWARD_REPLY,
                    component = COMPONENT,
                    channel = channel.name(),
                    endpoint = endpoint.name(),
                    reference = %reference,
                    "reply subscription matched"
                );
                dests.insert(endpoint);
            }
        }

        for endpoint in dests {
            let evicted = endpoint.queue().push(QueuedItem::new(item.msg.clone())).await;
            if evicted > 0 {
                warn!(
                    event = events::QUEUE_EVICT_OLDEST,
                    component = COMPONENT,
                    endpoint = endpoint.name(),
                    evicted,
                    "endpoint queue full, dropped oldest"
                );
            }
            debug!(
                event = events::FORWARD_DELIVER,
                component = COMPONENT,
                channel = channel.name(),
                endpoint = endpoint.name(),
                msg_id = %item.msg.uid,
                "forwarded message"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RouterConfig;
    use crate::message::Message;
    use crate::router::Router;
    use serde_json::json;
    use uuid::Uuid;

    async fn router() -> Router {
        Router::new(RouterConfig {
            queue_capacity: 16,
            ..RouterConfig::default()
        })
        .await
    }

    /// Yields until the channel's own queue has drained, which means its
    /// forwarder has picked everything up.
    async fn drained(channel: &crate::channel::Channel) {
        loop {
            if channel.queue().len().await == 0 {
                // A few extra yields so the forwarder finishes fan-out too.
                for _ in 0..8 {
                    tokio::task::yield_now().await;
                }
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn unrouted_channel_delivers_to_nobody() {
        let router = router().await;
        let channel = router.ensure_channel("orders").await;
        let bystander = router.ensure_endpoint("peer-a").await;

        router
            .publish(Message::new("orders", "new", json!({"qty": 1})))
            .await;
        drained(&channel).await;

        assert_eq!(bystander.queue().len().await, 0);
        router.shutdown().await;
    }

    #[tokio::test]
    async fn routed_messages_fan_out_to_every_destination_in_order() {
        let router = router().await;
        let channel = router.ensure_channel("orders").await;
        let first = router.ensure_endpoint("peer-a").await;
        let second = router.ensure_endpoint("peer-b").await;
        router.add_route(&channel, &first).await;
        router.add_route(&channel, &second).await;

        for n in 0..3u64 {
            router.publish(Message::new("orders", "new", json!(n))).await;
        }
        drained(&channel).await;

        for endpoint in [&first, &second] {
            for n in 0..3u64 {
                let item = endpoint.queue().pop().await;
                assert_eq!(item.msg.data, json!(n));
            }
        }
        router.shutdown().await;
    }

    #[tokio::test]
    async fn reply_subscription_delivers_exactly_once() {
        let router = router().await;
        let channel = router.ensure_channel("orders").await;
        let replier = router.ensure_endpoint("peer-b").await;
        let target = Uuid::new_v4();
        router.subscribe_reply(target, replier.clone()).await;

        let ack = Message::new("orders", "ack", json!("done")).with_reference(target);
        let duplicate = Message::new("orders", "ack", json!("again")).with_reference(target);
        router.publish(ack).await;
        router.publish(duplicate).await;
        drained(&channel).await;

        assert_eq!(replier.queue().len().await, 1);
        assert_eq!(replier.queue().pop().await.msg.data, json!("done"));
        assert!(!router.has_pending_reply(&target).await);
        router.shutdown().await;
    }

    #[tokio::test]
    async fn reply_endpoint_already_routed_receives_one_copy() {
        let router = router().await;
        let channel = router.ensure_channel("orders").await;
        let peer = router.ensure_endpoint("peer-b").await;
        router.add_route(&channel, &peer).await;
        let target = Uuid::new_v4();
        router.subscribe_reply(target, peer.clone()).await;

        router
            .publish(Message::new("orders", "ack", json!("done")).with_reference(target))
            .await;
        drained(&channel).await;

        // Routed and reply-matched, but the destination set deduplicates.
        assert_eq!(peer.queue().len().await, 1);
        router.shutdown().await;
    }

    #[tokio::test]
    async fn routes_added_after_dequeue_are_not_retroactive() {
        let router = router().await;
        let channel = router.ensure_channel("orders").await;

        router
            .publish(Message::new("orders", "new", json!(1)))
            .await;
        drained(&channel).await;

        let late = router.ensure_endpoint("peer-late").await;
        router.add_route(&channel, &late).await;

        assert_eq!(late.queue().len().await, 0);
        router.shutdown().await;
    }
}
