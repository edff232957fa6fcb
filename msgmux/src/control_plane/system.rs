/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Control plane bound to the reserved `"system"` channel.
//!
//! Peers reconfigure their own routing at runtime by sending ordinary
//! messages on the system channel; the hook installed here mutates the
//! routing tables as those messages flow through the channel's forwarder.
//! Nothing in this module can fail a channel: an unknown subject or a
//! payload that does not decode is logged at debug level and ignored.

use crate::message::Message;
use crate::observability::events;
use crate::router::Router;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

/// Name of the reserved control channel.
pub const SYSTEM_CHANNEL: &str = "system";

/// Control subject: deliver a channel's messages to an endpoint.
pub const SUBJECT_SUBSCRIBE_CHANNEL: &str = "subscribe.channel";
/// Control subject: deliver the reply to one specific message uid.
pub const SUBJECT_SUBSCRIBE_MESSAGE: &str = "subscribe.message";
/// Control subject: stop delivering a channel's messages to an endpoint.
pub const SUBJECT_UNSUBSCRIBE_CHANNEL: &str = "unsubscribe.channel";

const COMPONENT: &str = "system_control";

#[derive(Deserialize)]
struct ChannelSubscription {
    endpoint: String,
    channel: String,
}

#[derive(Deserialize)]
struct MessageSubscription {
    endpoint: String,
    uid: Uuid,
}

/// Hook state for the system channel.
///
/// Holds a handle to the router whose tables it mutates; this is how the
/// control plane can reconfigure routing from messages flowing through the
/// very channel it is bound to.
#[derive(Clone)]
pub(crate) struct SystemControl {
    router: Router,
}

impl SystemControl {
    pub(crate) fn new(router: Router) -> Self {
        Self { router }
    }

    /// Applies one control message.
    ///
    /// Always reports `true` (forward the message) so a defective payload
    /// cannot stall the channel; the system channel normally has no routed
    /// destinations, so forwarded control messages go nowhere.
    pub(crate) async fn on_message(&self, msg: &Message) -> bool {
        match msg.subject.as_str() {
            SUBJECT_SUBSCRIBE_CHANNEL => self.subscribe_channel(msg).await,
            SUBJECT_SUBSCRIBE_MESSAGE => self.subscribe_message(msg).await,
            SUBJECT_UNSUBSCRIBE_CHANNEL => self.unsubscribe_channel(msg).await,
            other => {
                debug!(
                    event = events::CONTROL_IGNORED,
                    component = COMPONENT,
                    subject = other,
                    reason = "unknown_subject",
                    "ignoring control message"
                );
            }
        }
        true
    }

    async fn subscribe_channel(&self, msg: &Message) {
        let Some(request) = self.decode::<ChannelSubscription>(msg) else {
            return;
        };

        let channel = self.router.ensure_channel(&request.channel).await;
        let endpoint = self.router.ensure_endpoint(&request.endpoint).await;
        self.router.add_route(&channel, &endpoint).await;

        debug!(
            event = events::CONTROL_SUBSCRIBE_CHANNEL,
            component = COMPONENT,
            channel = request.channel.as_str(),
            endpoint = request.endpoint.as_str(),
            "peer subscribed to channel"
        );
    }

    async fn subscribe_message(&self, msg: &Message) {
        let Some(request) = self.decode::<MessageSubscription>(msg) else {
            return;
        };

        let endpoint = self.router.ensure_endpoint(&request.endpoint).await;
        self.router.subscribe_reply(request.uid, endpoint).await;

        debug!(
            event = events::CONTROL_SUBSCRIBE_MESSAGE,
            component = COMPONENT,
            endpoint = request.endpoint.as_str(),
            uid = %request.uid,
            "peer subscribed to reply"
        );
    }

    async fn unsubscribe_channel(&self, msg: &Message) {
        let Some(request) = self.decode::<ChannelSubscription>(msg) else {
            return;
        };

        // Lookup only: unsubscribing must not create what it names.
        let channel = self.router.get_channel(&request.channel).await;
        let endpoint = self.router.get_endpoint(&request.endpoint).await;
        if let (Some(channel), Some(endpoint)) = (channel, endpoint) {
            self.router.delete_route(&channel, &endpoint).await;
            debug!(
                event = events::CONTROL_UNSUBSCRIBE_CHANNEL,
                component = COMPONENT,
                channel = request.channel.as_str(),
                endpoint = request.endpoint.as_str(),
                "peer unsubscribed from channel"
            );
        }
    }

    fn decode<'a, T: Deserialize<'a>>(&self, msg: &'a Message) -> Option<T> {
        match T::deserialize(&msg.data) {
            Ok(request) => Some(request),
            Err(err) => {
                debug!(
                    event = events::CONTROL_IGNORED,
                    component = COMPONENT,
                    subject = msg.subject.as_str(),
                    reason = "malformed_payload",
                    err = %err,
                    "ignoring control message"
                );
                None
            }
        }
    }
}
