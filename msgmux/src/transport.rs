/********************************************************************************
 * Copyright (c) 2026 Contributors to the msgmux project
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Transport seam between the router and the outside world.
//!
//! The router never touches sockets or wire encodings. It consumes a
//! [`Transport`] per connected peer (a bidirectional stream of [`Message`]
//! envelopes) and a [`TransportListener`] that yields one transport per
//! accepted peer together with the peer's claimed name. Concrete transports
//! (TCP, in-memory pairs for tests) live outside this crate or in the server
//! binary.

use crate::message::Message;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures surfaced by a transport implementation.
#[derive(Debug)]
pub enum TransportError {
    /// The peer closed the connection in an orderly fashion.
    Closed,
    /// Transport-level I/O failure.
    Io(String),
    /// The peer sent a frame that could not be decoded into a [`Message`].
    Malformed(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Closed => write!(f, "connection closed by peer"),
            TransportError::Io(detail) => write!(f, "transport i/o failure: {detail}"),
            TransportError::Malformed(detail) => write!(f, "undecodable frame: {detail}"),
        }
    }
}

impl Error for TransportError {}

/// A bidirectional, already-established stream of typed envelopes.
///
/// Implementations own whatever interior mutability their I/O halves need;
/// the router calls `recv` and `send` concurrently from one task via
/// `select!`, never from two tasks at once.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Receives the next inbound message, suspending until one arrives.
    async fn recv(&self) -> Result<Message, TransportError>;

    /// Sends one message to the peer, suspending on backpressure.
    async fn send(&self, message: &Message) -> Result<(), TransportError>;

    /// Closes the connection. Subsequent `recv`/`send` calls fail.
    async fn close(&self);
}

/// Source of accepted peer connections.
#[async_trait]
pub trait TransportListener: Send + Sync {
    /// Waits for the next peer, returning its claimed name and transport.
    ///
    /// Returning [`TransportError::Closed`] signals that no further peers
    /// will ever be accepted and ends the server accept loop.
    async fn accept(
        &self,
    ) -> Result<(String, std::sync::Arc<dyn Transport>), TransportError>;
}
