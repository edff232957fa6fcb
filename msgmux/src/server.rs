/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use crate::data_plane::connection;
use crate::observability::events;
use crate::router::Router;
use crate::transport::{TransportError, TransportListener};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::{info, warn};

const COMPONENT: &str = "server";

/// Accept loop binding a [`TransportListener`] to a [`Router`].
///
/// Each accepted peer gets one connection-handler task; a peer's transport
/// failure terminates only that handler. [`Server::stop`] ends the accept
/// loop, aborts all handlers, and shuts the router down.
#[derive(Clone)]
pub struct Server {
    router: Router,
    listener: Arc<dyn TransportListener>,
    shutdown: Arc<Notify>,
}

impl Server {
    pub fn new(router: Router, listener: Arc<dyn TransportListener>) -> Self {
        Self {
            router,
            listener,
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Accepts peers until [`Server::stop`] is called or the listener
    /// reports [`TransportError::Closed`].
    pub async fn run(&self) {
        info!(
            event = events::SERVER_STARTED,
            component = COMPONENT,
            "accepting peer connections"
        );

        let mut handlers = JoinSet::new();
        loop {
            tokio::select! {
                _ = self.shutdown.notified() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((peer, transport)) => {
                        handlers.spawn(connection::handle(
                            self.router.clone(),
                            peer,
                            transport,
                        ));
                    }
                    Err(TransportError::Closed) => break,
                    Err(err) => {
                        // Transient accept failure; the listener stays up.
                        warn!(
                            event = events::ACCEPT_FAILED,
                            component = COMPONENT,
                            err = %err,
                            "failed to accept peer"
                        );
                    }
                },
            }
        }

        handlers.abort_all();
        while handlers.join_next().await.is_some() {}
        self.router.shutdown().await;

        info!(
            event = events::SERVER_STOPPED,
            component = COMPONENT,
            "server stopped"
        );
    }

    /// Requests shutdown. Safe to call from any task, before or after
    /// [`Server::run`] starts waiting.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}
