// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Publish/subscribe transport to the message broker.
//!
//! The [`Transport`] trait is the raw link: connect, subscribe, publish and
//! disconnect, with inbound messages delivered on a channel that belongs to
//! a single connection. [`MqttTransport`] implements it with `rumqttc`.
//!
//! Connection status, client identifiers and telemetry handling live one
//! level up, in [`session::TransportSession`](crate::session::TransportSession).

#[cfg(test)]
pub(crate) mod mock;
mod mqtt;

pub use mqtt::{MqttTransport, MqttTransportConfig};

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::ProtocolError;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl InboundMessage {
    /// Creates a new inbound message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// A publish/subscribe link holding at most one live broker connection.
///
/// All futures are `Send` so that operations can run on spawned tasks, away
/// from whatever loop is rendering the state.
pub trait Transport: Send + Sync + 'static {
    /// Opens a connection with a clean session.
    ///
    /// Returns the receiver on which this connection delivers inbound
    /// messages, in arrival order. The channel closes when the connection
    /// ends; a later connection gets a fresh channel.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the address is invalid, the broker cannot
    /// be reached, or the handshake does not complete in time.
    fn connect(
        &self,
        address: &str,
        client_id: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<InboundMessage>, ProtocolError>> + Send;

    /// Subscribes the live connection to a topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::NotConnected` without a live connection, or
    /// the client error if the request is rejected.
    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Publishes a payload on a topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::NotConnected` without a live connection, or
    /// the client error if the request is rejected.
    fn publish(
        &self,
        topic: &str,
        payload: &[u8],
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Closes the live connection, if any.
    ///
    /// # Errors
    ///
    /// Returns the client error if the disconnect request fails. The
    /// connection is dropped either way.
    fn disconnect(&self) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Returns whether a connection is currently live.
    fn is_connected(&self) -> bool;
}
