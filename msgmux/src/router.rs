/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use crate::channel::Channel;
use crate::config::RouterConfig;
use crate::control_plane::reply_map::ReplyMap;
use crate::control_plane::route_table::RouteTable;
use crate::control_plane::system::{SystemControl, SYSTEM_CHANNEL};
use crate::data_plane::{expiry, forwarder, forwarder::ChannelHook};
use crate::endpoint::Endpoint;
use crate::message::Message;
use crate::observability::events;
use crate::queue::QueuedItem;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

const COMPONENT: &str = "router";

/// The switching fabric: owns channels, endpoints, the routing table, the
/// reply map, and one forwarder task per channel.
///
/// `Router` is a cheap-to-clone handle; every task created by the router
/// (forwarders, the expiry sweep, connection handlers spawned by a
/// [`Server`](crate::Server)) holds a clone. There is no process-wide
/// singleton: the embedding host constructs a router and passes it around.
///
/// Construction installs the control plane on the reserved [`SYSTEM_CHANNEL`]
/// and starts the expiry sweep; [`Router::shutdown`] stops everything the
/// router spawned.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    config: RouterConfig,
    channels: Mutex<HashMap<String, Channel>>,
    endpoints: Mutex<HashMap<String, Endpoint>>,
    route_table: RouteTable,
    reply_map: ReplyMap,
    forwarders: Mutex<HashMap<String, JoinHandle<()>>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Router {
    /// Creates a router, installs the system control plane, and starts the
    /// expiry sweep. Must run inside a tokio runtime.
    pub async fn new(config: RouterConfig) -> Self {
        let sweep_interval = config.sweep_interval;
        let max_age = config.max_age;

        let router = Self {
            inner: Arc::new(RouterInner {
                config,
                channels: Mutex::new(HashMap::new()),
                endpoints: Mutex::new(HashMap::new()),
                route_table: RouteTable::new(),
                reply_map: ReplyMap::new(),
                forwarders: Mutex::new(HashMap::new()),
                sweeper: Mutex::new(None),
            }),
        };

        router
            .ensure_channel_with_hook(
                SYSTEM_CHANNEL,
                ChannelHook::System(SystemControl::new(router.clone())),
            )
            .await;

        let sweeper = tokio::spawn(expiry::run(router.clone(), sweep_interval, max_age));
        *router.inner.sweeper.lock().await = Some(sweeper);

        router
    }

    /// Returns the channel named `name`, creating it (and spawning its
    /// forwarder) if absent.
    pub async fn ensure_channel(&self, name: &str) -> Channel {
        self.ensure_channel_with_hook(name, ChannelHook::None).await
    }

    // The system hook creates channels from inside a forwarder, so this
    // future is recursive (it spawns the forwarder whose hook calls back into
    // it). Boxing the return erases the cycle from the future's type.
    pub(crate) fn ensure_channel_with_hook<'a>(
        &'a self,
        name: &'a str,
        hook: ChannelHook,
    ) -> Pin<Box<dyn Future<Output = Channel> + Send + 'a>> {
        Box::pin(async move {
            let mut channels = self.inner.channels.lock().await;
            if let Some(existing) = channels.get(name) {
                return existing.clone();
            }

            let channel = Channel::new(name, self.inner.config.queue_capacity);
            channels.insert(name.to_string(), channel.clone());
            debug!(
                event = events::CHANNEL_CREATE,
                component = COMPONENT,
                channel = name,
                "created channel"
            );

            // Exactly one forwarder per channel, spawned under the creation
            // lock so a racing ensure_channel cannot start a second one.
            let handle = tokio::spawn(forwarder::run(self.clone(), channel.clone(), hook));
            self.inner
                .forwarders
                .lock()
                .await
                .insert(name.to_string(), handle);

            channel
        })
    }

    /// Returns the channel named `name`, or `None` if it was never created.
    pub async fn get_channel(&self, name: &str) -> Option<Channel> {
        self.inner.channels.lock().await.get(name).cloned()
    }

    /// Returns the endpoint named `name`, creating it if absent. Endpoints
    /// are never destroyed, so a reconnecting peer gets its old queue back.
    pub async fn ensure_endpoint(&self, name: &str) -> Endpoint {
        let mut endpoints = self.inner.endpoints.lock().await;
        if let Some(existing) = endpoints.get(name) {
            return existing.clone();
        }

        let endpoint = Endpoint::new(name, self.inner.config.queue_capacity);
        endpoints.insert(name.to_string(), endpoint.clone());
        debug!(
            event = events::ENDPOINT_CREATE,
            component = COMPONENT,
            endpoint = name,
            "created endpoint"
        );
        endpoint
    }

    /// Returns the endpoint named `name`, or `None` if it was never created.
    pub async fn get_endpoint(&self, name: &str) -> Option<Endpoint> {
        self.inner.endpoints.lock().await.get(name).cloned()
    }

    /// Idempotently adds a `channel -> endpoint` edge. Returns `true` only
    /// when the edge was newly inserted.
    pub async fn add_route(&self, channel: &Channel, endpoint: &Endpoint) -> bool {
        let inserted = self
            .inner
            .route_table
            .insert_route(channel.name(), endpoint.clone())
            .await;
        if inserted {
            info!(
                event = events::ROUTE_ADD,
                component = COMPONENT,
                channel = channel.name(),
                endpoint = endpoint.name(),
                "route added"
            );
        }
        inserted
    }

    /// Idempotently removes a `channel -> endpoint` edge. Already-queued
    /// endpoint items are not retracted. Returns `true` only when the edge
    /// existed.
    pub async fn delete_route(&self, channel: &Channel, endpoint: &Endpoint) -> bool {
        let removed = self
            .inner
            .route_table
            .remove_route(channel.name(), endpoint)
            .await;
        if removed {
            info!(
                event = events::ROUTE_REMOVE,
                component = COMPONENT,
                channel = channel.name(),
                endpoint = endpoint.name(),
                "route removed"
            );
        }
        removed
    }

    /// Snapshot of the current destinations for `channel`. The caller owns
    /// the returned set; later routing changes do not affect it.
    pub async fn routes(&self, channel: &Channel) -> HashSet<Endpoint> {
        self.routes_by_name(channel.name()).await
    }

    pub(crate) async fn routes_by_name(&self, channel: &str) -> HashSet<Endpoint> {
        self.inner.route_table.snapshot(channel).await
    }

    /// Registers `endpoint` to receive the first message whose `reference`
    /// equals `uid`, independent of channel routing.
    pub async fn subscribe_reply(&self, uid: Uuid, endpoint: Endpoint) {
        debug!(
            event = events::REPLY_SUBSCRIBE,
            component = COMPONENT,
            endpoint = endpoint.name(),
            uid = %uid,
            "reply subscription added"
        );
        self.inner.reply_map.set(uid, endpoint).await;
    }

    /// Whether a reply subscription for `uid` has not yet been consumed.
    pub async fn has_pending_reply(&self, uid: &Uuid) -> bool {
        self.inner.reply_map.contains(uid).await
    }

    pub(crate) async fn take_reply(&self, uid: &Uuid) -> Option<Endpoint> {
        self.inner.reply_map.take(uid).await
    }

    /// In-process ingress: enqueues `msg` into the channel it names,
    /// creating the channel on first reference. Never blocks; a full queue
    /// drops its oldest entries.
    pub async fn publish(&self, msg: Message) {
        let channel = self.ensure_channel(&msg.channel).await;
        channel.queue().push(QueuedItem::new(msg)).await;
    }

    pub(crate) async fn endpoints_snapshot(&self) -> Vec<Endpoint> {
        self.inner.endpoints.lock().await.values().cloned().collect()
    }

    /// Aborts every task this router spawned: all forwarders and the expiry
    /// sweep. Queues and routing state remain readable afterwards.
    pub async fn shutdown(&self) {
        info!(
            event = events::ROUTER_SHUTDOWN,
            component = COMPONENT,
            "router shutting down"
        );
        for (_, handle) in self.inner.forwarders.lock().await.drain() {
            handle.abort();
        }
        if let Some(sweeper) = self.inner.sweeper.lock().await.take() {
            sweeper.abort();
        }
    }
}
