//! Control-plane layer.
//!
//! Owns the routing state the data plane reads: the channel-to-endpoint
//! route table, the one-shot reply map, and the hook bound to the reserved
//! `"system"` channel that mutates both from inbound control messages.
//! Mutations are idempotent and never fail a channel: a malformed control
//! message is ignored, not propagated.

pub(crate) mod reply_map;
pub(crate) mod route_table;
pub(crate) mod system;
