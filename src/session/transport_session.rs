// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection lifecycle on top of a [`Transport`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::SessionConfig;
use crate::error::{Error, ProtocolError, Result};
use crate::protocol::{InboundMessage, Transport};
use crate::state::{ConnectionStatus, StateStore};
use crate::telemetry;

/// Owns the broker connection and reports its lifecycle to a [`StateStore`].
///
/// Every [`connect`](Self::connect) tears down the previous connection,
/// uses a fresh client identifier, and feeds telemetry from the sensor
/// topic into the store in arrival order.
///
/// `TransportSession` is cheaply cloneable; clones share the connection.
pub struct TransportSession<T: Transport> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    transport: Arc<T>,
    store: StateStore,
    config: SessionConfig,
    /// Bumped on every connect and disconnect. Lets an ingest task tell a
    /// dropped connection apart from one that was torn down on purpose.
    generation: AtomicU64,
    ingest: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Transport> Inner<T> {
    fn stop_ingest(&self) {
        if let Some(handle) = self.ingest.lock().take() {
            handle.abort();
        }
    }
}

impl<T: Transport> Clone for TransportSession<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> TransportSession<T> {
    /// Creates a session over `transport` reporting to `store`.
    #[must_use]
    pub fn new(transport: Arc<T>, store: StateStore, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                store,
                config,
                generation: AtomicU64::new(0),
                ingest: Mutex::new(None),
            }),
        }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Returns the store this session reports to.
    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Connects to the broker at `address`.
    ///
    /// A live connection is disconnected first; failures doing so are
    /// logged and ignored. The status goes to `Connecting`, then to
    /// `Connected` (followed by the sensor subscription) or to
    /// `Failed(reason)`.
    ///
    /// Overlapping calls are not serialized: if an older attempt completes
    /// after a newer one started, its status update wins.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the connection cannot be established.
    /// The same error text is already reflected in the connection status.
    pub async fn connect(&self, address: &str) -> Result<()> {
        let inner = &self.inner;
        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        inner.stop_ingest();

        if inner.transport.is_connected()
            && let Err(e) = inner.transport.disconnect().await
        {
            tracing::warn!(error = %e, "Ignoring disconnect failure before reconnect");
        }

        inner
            .store
            .apply_connection_status(ConnectionStatus::Connecting);

        let client_id = generate_client_id(inner.config.client_id_prefix());
        tracing::info!(%address, %client_id, "Connecting to broker");

        match inner.transport.connect(address, &client_id).await {
            Ok(inbound) => {
                inner
                    .store
                    .apply_connection_status(ConnectionStatus::Connected);
                self.spawn_ingest(inbound, generation);

                if let Err(e) = self.subscribe().await {
                    tracing::warn!(error = %e, "Continuing without sensor subscription");
                }
                Ok(())
            }
            Err(e) => {
                let reason = match &e {
                    ProtocolError::ConnectionFailed(reason) => reason.clone(),
                    other => other.to_string(),
                };
                inner
                    .store
                    .apply_connection_status(ConnectionStatus::Failed(reason));
                Err(e.into())
            }
        }
    }

    /// Runs [`connect`](Self::connect) on a new task.
    ///
    /// Failures are already visible through the connection status, so the
    /// task only logs them.
    pub fn spawn_connect(&self, address: impl Into<String>) -> JoinHandle<()> {
        let session = self.clone();
        let address = address.into();

        tokio::spawn(async move {
            if let Err(e) = session.connect(&address).await {
                tracing::warn!(%address, error = %e, "Broker connection attempt failed");
            }
        })
    }

    /// Subscribes to the sensor topic.
    ///
    /// # Errors
    ///
    /// Returns the transport error. The connection status is left as is,
    /// unless the session is configured to report subscription failures as
    /// failed connections.
    pub async fn subscribe(&self) -> Result<()> {
        let topic = self.inner.config.sensor_topic();

        match self.inner.transport.subscribe(topic).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Sensor subscription failed");
                if self.inner.config.subscribe_failure_as_failed() {
                    self.inner
                        .store
                        .apply_connection_status(ConnectionStatus::Failed(format!(
                            "subscription to {topic} failed: {e}"
                        )));
                }
                Err(e.into())
            }
        }
    }

    /// Publishes `payload` on `topic`.
    ///
    /// Skipped without any network call unless the session is connected;
    /// a skipped publish is not an error.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the publish itself fails.
    pub async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let status_connected = self
            .inner
            .store
            .read(|state| state.connection_status().is_connected());

        if !status_connected || !self.inner.transport.is_connected() {
            tracing::debug!(topic = %topic, "Skipping publish while disconnected");
            return Ok(());
        }

        self.inner
            .transport
            .publish(topic, payload)
            .await
            .map_err(Error::from)
    }

    /// Closes the connection and marks the session `Disconnected`.
    ///
    /// # Errors
    ///
    /// Returns the transport error; the session is disconnected regardless.
    pub async fn disconnect(&self) -> Result<()> {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.stop_ingest();

        let result = self.inner.transport.disconnect().await;
        self.inner
            .store
            .apply_connection_status(ConnectionStatus::Disconnected);

        result.map_err(Error::from)
    }

    /// Feeds one connection's inbound messages into the store.
    fn spawn_ingest(&self, mut inbound: mpsc::Receiver<InboundMessage>, generation: u64) {
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            while let Some(message) = inbound.recv().await {
                if message.topic != inner.config.sensor_topic() {
                    tracing::trace!(topic = %message.topic, "Ignoring message on foreign topic");
                    continue;
                }
                apply_payload(&inner.store, &message.payload);
            }

            // Channel closed without a local teardown: the broker link died.
            if inner.generation.load(Ordering::SeqCst) == generation {
                tracing::warn!("Broker connection lost");
                inner
                    .store
                    .apply_connection_status(ConnectionStatus::Failed(
                        "connection lost".to_string(),
                    ));
            }
        });

        let previous = self.inner.ingest.lock().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl<T: Transport> std::fmt::Debug for TransportSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSession")
            .field("sensor_topic", &self.inner.config.sensor_topic())
            .field("connected", &self.inner.transport.is_connected())
            .finish_non_exhaustive()
    }
}

/// Decodes a telemetry payload and applies it to `store`.
///
/// Undecodable payloads are logged and dropped; the store is untouched.
/// Returns true if the payload was decoded.
pub(crate) fn apply_payload(store: &StateStore, payload: &[u8]) -> bool {
    match telemetry::decode(payload) {
        Ok(reading) => {
            store.apply_telemetry(reading);
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, bytes = payload.len(), "Discarding undecodable telemetry");
            false
        }
    }
}

/// Builds a client identifier: `prefix` followed by 8 random hex characters.
fn generate_client_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &suffix[..8])
}
