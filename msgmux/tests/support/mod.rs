//! In-memory transport pair and assertion helpers for end-to-end scenarios.

use async_trait::async_trait;
use msgmux::{Message, Router, Transport, TransportError, TransportListener};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, timeout, Duration};
use uuid::Uuid;

const WAIT_BUDGET: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(5);
const SILENCE_BUDGET: Duration = Duration::from_millis(200);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// One half of a cross-wired in-memory connection.
///
/// Dropping a half closes the other half's `recv`, which is how tests
/// simulate a peer disconnecting.
pub struct MemoryTransport {
    tx: mpsc::UnboundedSender<Message>,
    rx: Mutex<mpsc::UnboundedReceiver<Message>>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn recv(&self) -> Result<Message, TransportError> {
        self.rx
            .lock()
            .await
            .recv()
            .await
            .ok_or(TransportError::Closed)
    }

    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        self.tx
            .send(message.clone())
            .map_err(|_| TransportError::Closed)
    }

    async fn close(&self) {
        self.rx.lock().await.close();
    }
}

fn transport_pair() -> (MemoryTransport, MemoryTransport) {
    let (near_tx, far_rx) = mpsc::unbounded_channel();
    let (far_tx, near_rx) = mpsc::unbounded_channel();
    (
        MemoryTransport {
            tx: near_tx,
            rx: Mutex::new(near_rx),
        },
        MemoryTransport {
            tx: far_tx,
            rx: Mutex::new(far_rx),
        },
    )
}

/// Client-side handle for opening connections against a [`MemoryListener`].
pub struct MemoryHub {
    connects: mpsc::UnboundedSender<(String, Arc<dyn Transport>)>,
}

impl MemoryHub {
    /// Opens a connection claiming `peer` as identity and returns the
    /// client-side transport.
    pub fn connect(&self, peer: &str) -> MemoryTransport {
        let (client, server) = transport_pair();
        self.connects
            .send((peer.to_string(), Arc::new(server)))
            .expect("listener should be alive");
        client
    }
}

pub struct MemoryListener {
    pending: Mutex<mpsc::UnboundedReceiver<(String, Arc<dyn Transport>)>>,
}

#[async_trait]
impl TransportListener for MemoryListener {
    async fn accept(&self) -> Result<(String, Arc<dyn Transport>), TransportError> {
        self.pending
            .lock()
            .await
            .recv()
            .await
            .ok_or(TransportError::Closed)
    }
}

pub fn memory_hub() -> (MemoryHub, MemoryListener) {
    let (connects, pending) = mpsc::unbounded_channel();
    (
        MemoryHub { connects },
        MemoryListener {
            pending: Mutex::new(pending),
        },
    )
}

/// Polls until `channel -> endpoint` is visible in the routing table.
/// Control messages are applied asynchronously by the system channel's
/// forwarder, so tests must synchronize before publishing.
pub async fn wait_for_route(router: &Router, channel: &str, endpoint: &str) {
    timeout(WAIT_BUDGET, async {
        loop {
            if let Some(channel) = router.get_channel(channel).await {
                if router
                    .routes(&channel)
                    .await
                    .iter()
                    .any(|e| e.name() == endpoint)
                {
                    return;
                }
            }
            sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .expect("route should appear");
}

/// Polls until `channel -> endpoint` is no longer routed.
pub async fn wait_for_no_route(router: &Router, channel: &str, endpoint: &str) {
    timeout(WAIT_BUDGET, async {
        loop {
            match router.get_channel(channel).await {
                Some(channel)
                    if router
                        .routes(&channel)
                        .await
                        .iter()
                        .any(|e| e.name() == endpoint) =>
                {
                    sleep(POLL_INTERVAL).await;
                }
                _ => return,
            }
        }
    })
    .await
    .expect("route should disappear");
}

/// Polls until a reply subscription for `uid` is registered.
pub async fn wait_for_pending_reply(router: &Router, uid: &Uuid) {
    timeout(WAIT_BUDGET, async {
        while !router.has_pending_reply(uid).await {
            sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .expect("reply subscription should appear");
}

pub async fn recv_one(transport: &MemoryTransport) -> Message {
    timeout(WAIT_BUDGET, transport.recv())
        .await
        .expect("message should arrive in time")
        .expect("transport should stay open")
}

pub async fn assert_silence(transport: &MemoryTransport) {
    assert!(
        timeout(SILENCE_BUDGET, transport.recv()).await.is_err(),
        "expected no further delivery"
    );
}
