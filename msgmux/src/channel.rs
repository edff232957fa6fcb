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

/// A named ingress point: every message a peer sends lands in the bounded
/// queue of the channel it names, and exactly one forwarder task drains it.
///
/// Channels are created lazily on first reference and live for the process
/// lifetime. The handle is cheap to clone; all clones share one queue.
#[derive(Clone)]
pub struct Channel {
    name: Arc<str>,
    queue: Arc<MessageQueue>,
}

impl Channel {
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

// Channel names are unique within a router, so identity is by name. This is
// what lets route destination sets deduplicate fan-out targets.
impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Channel {}

impl Hash for Channel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Debug for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("capacity", &self.queue.capacity())
            .finish()
    }
}
