//! Route-table data model: which endpoints a channel fans out to.

use crate::endpoint::Endpoint;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// Many-to-many `channel name -> set<Endpoint>` registry.
///
/// Edges exist only via explicit control messages (or embedding-host calls).
/// Reads hand out snapshots, so a forwarder's fan-out set is fixed at the
/// moment a message leaves its channel queue; routes added later are never
/// applied retroactively.
pub(crate) struct RouteTable {
    routes: Mutex<HashMap<String, HashSet<Endpoint>>>,
}

impl RouteTable {
    /// Creates an empty route table.
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
        }
    }

    /// Adds an edge. Returns `true` only when the edge was not yet present.
    pub(crate) async fn insert_route(&self, src: &str, dest: Endpoint) -> bool {
        let mut routes = self.routes.lock().await;
        routes.entry(src.to_string()).or_default().insert(dest)
    }

    /// Removes an edge. Returns `true` only when the edge existed.
    pub(crate) async fn remove_route(&self, src: &str, dest: &Endpoint) -> bool {
        let mut routes = self.routes.lock().await;
        routes
            .get_mut(src)
            .map(|dests| dests.remove(dest))
            .unwrap_or(false)
    }

    /// Point-in-time copy of the destinations for `src`.
    ///
    /// Unknown sources yield an empty set; they are not an error.
    pub(crate) async fn snapshot(&self, src: &str) -> HashSet<Endpoint> {
        let routes = self.routes.lock().await;
        routes.get(src).cloned().unwrap_or_default()
    }
}
