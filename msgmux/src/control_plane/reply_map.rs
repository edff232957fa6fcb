//! One-shot reply correlation table.

use crate::endpoint::Endpoint;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// `uid -> Endpoint` table for request/response correlation independent of
/// channel routing.
///
/// `take` is a single locked check-and-remove, so when several forwarders
/// race on messages carrying the same reference, exactly one of them
/// receives the endpoint.
pub(crate) struct ReplyMap {
    replies: Mutex<HashMap<Uuid, Endpoint>>,
}

impl ReplyMap {
    pub(crate) fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `dest` as the recipient of the first message referencing
    /// `uid`. A later registration for the same uid replaces the earlier one.
    pub(crate) async fn set(&self, uid: Uuid, dest: Endpoint) {
        self.replies.lock().await.insert(uid, dest);
    }

    /// Atomically removes and returns the endpoint registered for `uid`.
    pub(crate) async fn take(&self, uid: &Uuid) -> Option<Endpoint> {
        self.replies.lock().await.remove(uid)
    }

    /// Whether a registration for `uid` is still pending.
    pub(crate) async fn contains(&self, uid: &Uuid) -> bool {
        self.replies.lock().await.contains_key(uid)
    }
}
