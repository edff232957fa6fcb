/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! TCP transport speaking newline-delimited JSON envelopes.
//!
//! Wire protocol: on connect, the peer sends one line carrying its claimed
//! name; every following line in either direction is one JSON-encoded
//! [`Message`]. serde_json escapes embedded newlines, so line framing is
//! unambiguous.

use async_trait::async_trait;
use msgmux::{Message, Transport, TransportError, TransportListener};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::debug;

const HANDSHAKE_BUDGET: Duration = Duration::from_secs(5);

pub struct TcpTransportListener {
    listener: TcpListener,
}

impl TcpTransportListener {
    pub async fn bind(addr: impl ToSocketAddrs) -> std::io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr).await?,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

#[async_trait]
impl TransportListener for TcpTransportListener {
    async fn accept(&self) -> Result<(String, Arc<dyn Transport>), TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(|err| TransportError::Io(err.to_string()))?;

        // Handshake inline: the first line is the claimed peer name. The
        // budget keeps a stalled client from holding up the accept loop
        // indefinitely. Handshake failures are reported as per-connection
        // errors, never as listener closure.
        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        let read = timeout(HANDSHAKE_BUDGET, reader.read_line(&mut line))
            .await
            .map_err(|_| TransportError::Io(format!("handshake timed out for {addr}")))?
            .map_err(|err| TransportError::Io(err.to_string()))?;
        if read == 0 {
            return Err(TransportError::Malformed(format!(
                "{addr} closed before sending a peer name"
            )));
        }
        let name = line.trim();
        if name.is_empty() {
            return Err(TransportError::Malformed(format!(
                "{addr} sent an empty peer name"
            )));
        }

        debug!(peer = name, %addr, "accepted tcp peer");
        Ok((
            name.to_string(),
            Arc::new(TcpTransport {
                reader: Mutex::new(reader),
                writer: Mutex::new(write_half),
            }),
        ))
    }
}

pub struct TcpTransport {
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
}

#[async_trait]
impl Transport for TcpTransport {
    async fn recv(&self) -> Result<Message, TransportError> {
        let mut line = String::new();
        let read = self
            .reader
            .lock()
            .await
            .read_line(&mut line)
            .await
            .map_err(|err| TransportError::Io(err.to_string()))?;
        if read == 0 {
            return Err(TransportError::Closed);
        }
        serde_json::from_str(&line).map_err(|err| TransportError::Malformed(err.to_string()))
    }

    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        let mut frame = serde_json::to_string(message)
            .map_err(|err| TransportError::Io(err.to_string()))?;
        frame.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|err| TransportError::Io(err.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|err| TransportError::Io(err.to_string()))
    }

    async fn close(&self) {
        let _ = self.writer.lock().await.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::TcpTransportListener;
    use msgmux::{Message, TransportError, TransportListener};
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    async fn listener() -> (TcpTransportListener, std::net::SocketAddr) {
        let listener = TcpTransportListener::bind("127.0.0.1:0")
            .await
            .expect("bind should succeed");
        let addr = listener.local_addr().expect("local addr");
        (listener, addr)
    }

    #[tokio::test]
    async fn handshake_yields_peer_name_and_messages_round_trip() {
        let (listener, addr) = listener().await;

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.expect("connect");
            stream.write_all(b"peer-a\n").await.expect("handshake");
            let msg = Message::new("orders", "new", json!({"qty": 1}));
            let mut frame = serde_json::to_string(&msg).expect("encode");
            frame.push('\n');
            stream.write_all(frame.as_bytes()).await.expect("send");
            msg
        });

        let (name, transport) = listener.accept().await.expect("accept should succeed");
        assert_eq!(name, "peer-a");

        let sent = client.await.expect("client task");
        let received = transport.recv().await.expect("recv should succeed");
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn server_sent_messages_arrive_framed_by_newline() {
        let (listener, addr) = listener().await;

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.expect("connect");
            stream.write_all(b"peer-a\n").await.expect("handshake");
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            reader.read_line(&mut line).await.expect("read frame");
            serde_json::from_str::<Message>(&line).expect("decode frame")
        });

        let (_, transport) = listener.accept().await.expect("accept should succeed");
        let msg = Message::new("orders", "new", json!("payload"));
        transport.send(&msg).await.expect("send should succeed");

        assert_eq!(client.await.expect("client task"), msg);
    }

    #[tokio::test]
    async fn empty_peer_name_is_rejected_without_closing_the_listener() {
        let (listener, addr) = listener().await;

        tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.expect("connect");
            stream.write_all(b"\n").await.expect("handshake");
        });

        match listener.accept().await {
            Err(TransportError::Malformed(_)) => {}
            Err(other) => panic!("expected malformed handshake, got {other:?}"),
            Ok(_) => panic!("expected malformed handshake, got an accepted peer"),
        }
    }

    #[tokio::test]
    async fn undecodable_frame_is_reported_as_malformed() {
        let (listener, addr) = listener().await;

        tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.expect("connect");
            stream
                .write_all(b"peer-a\nthis is not json\n")
                .await
                .expect("write");
        });

        let (_, transport) = listener.accept().await.expect("accept should succeed");
        match transport.recv().await {
            Err(TransportError::Malformed(_)) => {}
            other => panic!("expected malformed frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn orderly_close_surfaces_as_closed() {
        let (listener, addr) = listener().await;

        tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.expect("connect");
            stream.write_all(b"peer-a\n").await.expect("handshake");
            // Drop closes the socket.
        });

        let (_, transport) = listener.accept().await.expect("accept should succeed");
        match transport.recv().await {
            Err(TransportError::Closed) => {}
            other => panic!("expected closed, got {other:?}"),
        }
    }
}
