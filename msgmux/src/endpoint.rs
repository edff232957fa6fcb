/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use crate::queue::MessageQueue;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A named egress point, one per peer identity.
///
/// Forwarders enqueue here and the peer's connection handler drains toward
/// the wire. An endpoint is never destroyed once created: a peer that
/// reconnects under the same name picks up the same queue, recovering any
/// messages that were routed to it while it was away (subject to queue
/// capacity and the expiry sweep).
#[derive(Clone)]
pub struct Endpoint {
    name: Arc<str>,
    queue: Arc<MessageQueue>,
}

impl Endpoint {
    pub(crate) fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: Arc::from(name),
            queue: Arc::new(MessageQueue::new(capacity)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn queue(&self) -> &MessageQueue {
        &self.queue
    }
}

// Peer names are unique within a router; identity is by name.
impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Debug for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("capacity", &self.queue.capacity())
            .finish()
    }
}
