//! Canonical structured event names used across `msgmux`.

// Forwarder and queue events.
pub const FORWARDER_START: &str = "forwarder_start";
pub const FORWARD_DELIVER: &str = "forward_deliver";
pub const FORWARD_REPLY: &str = "forward_reply";
pub const QUEUE_EVICT_OLDEST: &str = "queue_evict_oldest";
pub const QUEUE_EVICT_EXPIRED: &str = "queue_evict_expired";

// Control-plane events.
pub const CONTROL_SUBSCRIBE_CHANNEL: &str = "control_subscribe_channel";
pub const CONTROL_SUBSCRIBE_MESSAGE: &str = "control_subscribe_message";
pub const CONTROL_UNSUBSCRIBE_CHANNEL: &str = "control_unsubscribe_channel";
pub const CONTROL_IGNORED: &str = "control_ignored";

// Router lifecycle events.
pub const CHANNEL_CREATE: &str = "channel_create";
pub const ENDPOINT_CREATE: &str = "endpoint_create";
pub const ROUTE_ADD: &str = "route_add";
pub const ROUTE_REMOVE: &str = "route_remove";
pub const REPLY_SUBSCRIBE: &str = "reply_subscribe";
pub const ROUTER_SHUTDOWN: &str = "router_shutdown";

// Connection and server events.
pub const PEER_CONNECTED: &str = "peer_connected";
pub const PEER_DISCONNECTED: &str = "peer_disconnected";
pub const INGRESS_QUEUED: &str = "ingress_queued";
pub const ACCEPT_FAILED: &str = "accept_failed";
pub const SERVER_STARTED: &str = "server_started";
pub const SERVER_STOPPED: &str = "server_stopped";
