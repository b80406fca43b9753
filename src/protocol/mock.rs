// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transport for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{InboundMessage, Transport};
use crate::error::ProtocolError;

/// A call recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Connect { address: String, client_id: String },
    Subscribe(String),
    Publish { topic: String, payload: String },
    Disconnect,
}

/// Transport that records calls and lets tests inject inbound messages.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    calls: Mutex<Vec<Call>>,
    inbound_tx: Mutex<Option<mpsc::Sender<InboundMessage>>>,
    connected: AtomicBool,
    connect_error: Mutex<Option<String>>,
    fail_subscribe: AtomicBool,
    fail_publish: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following connect fail with `reason`.
    pub fn fail_connect_with(&self, reason: &str) {
        *self.connect_error.lock() = Some(reason.to_string());
    }

    pub fn allow_connect(&self) {
        *self.connect_error.lock() = None;
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Simulates the broker dropping the connection.
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.inbound_tx.lock().take();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Publish { topic, payload } => Some((topic, payload)),
                _ => None,
            })
            .collect()
    }

    /// Delivers a message as if the broker had sent it.
    pub async fn deliver(&self, topic: &str, payload: &[u8]) {
        let tx = self.inbound_tx.lock().clone();
        if let Some(tx) = tx {
            tx.send(InboundMessage::new(topic, payload))
                .await
                .expect("inbound receiver dropped");
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl Transport for MockTransport {
    async fn connect(
        &self,
        address: &str,
        client_id: &str,
    ) -> Result<mpsc::Receiver<InboundMessage>, ProtocolError> {
        self.record(Call::Connect {
            address: address.to_string(),
            client_id: client_id.to_string(),
        });

        let error = self.connect_error.lock().clone();
        if let Some(reason) = error {
            return Err(ProtocolError::ConnectionFailed(reason));
        }

        let (tx, rx) = mpsc::channel(16);
        *self.inbound_tx.lock() = Some(tx);
        self.connected.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        self.record(Call::Subscribe(topic.to_string()));
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(ProtocolError::ConnectionFailed("subscribe rejected".to_string()));
        }
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), ProtocolError> {
        self.record(Call::Publish {
            topic: topic.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
        });
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(ProtocolError::ConnectionFailed("publish rejected".to_string()));
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProtocolError> {
        self.record(Call::Disconnect);
        self.connected.store(false, Ordering::SeqCst);
        self.inbound_tx.lock().take();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
