// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport built on `rumqttc`.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use homeguard_lib::protocol::{MqttTransport, MqttTransportConfig, Transport};
//!
//! # async fn example() -> homeguard_lib::Result<()> {
//! let transport = MqttTransport::with_config(
//!     MqttTransportConfig::default().connection_timeout(Duration::from_secs(5)),
//! );
//!
//! let mut inbound = transport.connect("tcp://192.168.1.50:1883", "android_1a2b3c4d").await?;
//! transport.subscribe("pos_iot/sensor").await?;
//!
//! while let Some(message) = inbound.recv().await {
//!     println!("{}: {} bytes", message.topic, message.payload.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{InboundMessage, Transport};
use crate::error::ProtocolError;

/// Time the event loop gets to flush a DISCONNECT before it is aborted.
const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

/// Shortest non-zero keep-alive `rumqttc` accepts.
const MIN_KEEP_ALIVE: Duration = Duration::from_secs(1);

/// Configuration for [`MqttTransport`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use homeguard_lib::protocol::MqttTransportConfig;
///
/// let config = MqttTransportConfig::default()
///     .keep_alive(Duration::from_secs(60))
///     .credentials("user", "password");
///
/// assert_eq!(config.keep_alive_interval(), Duration::from_secs(60));
/// assert!(config.has_credentials());
/// ```
#[derive(Debug, Clone)]
pub struct MqttTransportConfig {
    keep_alive: Duration,
    connection_timeout: Duration,
    credentials: Option<(String, String)>,
    inbound_capacity: usize,
}

impl Default for MqttTransportConfig {
    fn default() -> Self {
        Self {
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            credentials: None,
            inbound_capacity: 64,
        }
    }
}

impl MqttTransportConfig {
    /// Sets the keep-alive interval (default: 30 seconds).
    ///
    /// The broker only understands whole seconds: a non-zero interval below
    /// one second is raised to one second. Zero disables keep-alive.
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = if duration.is_zero() {
            duration
        } else {
            duration.max(MIN_KEEP_ALIVE)
        };
        self
    }

    /// Sets how long to wait for the broker's CONNACK (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.connection_timeout = duration;
        self
    }

    /// Sets authentication credentials. None are sent by default.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the inbound message buffer size (default: 64).
    #[must_use]
    pub fn inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity.max(1);
        self
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive_interval(&self) -> Duration {
        self.keep_alive
    }

    /// Returns how long a connect waits for the broker's CONNACK.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Returns whether authentication is configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

/// The live connection held by an [`MqttTransport`].
struct LiveConnection {
    client: AsyncClient,
    client_id: String,
    connected: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl LiveConnection {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// MQTT implementation of [`Transport`].
///
/// Each [`connect`](Transport::connect) creates a new `rumqttc` client and
/// event-loop task. The event loop does not reconnect on its own: the first
/// network error ends the connection, and reconnecting is up to the caller.
pub struct MqttTransport {
    config: MqttTransportConfig,
    live: Mutex<Option<LiveConnection>>,
}

impl Default for MqttTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MqttTransport {
    /// Creates a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MqttTransportConfig::default())
    }

    /// Creates a transport with the given configuration.
    #[must_use]
    pub fn with_config(config: MqttTransportConfig) -> Self {
        Self {
            config,
            live: Mutex::new(None),
        }
    }

    /// Returns the transport configuration.
    #[must_use]
    pub fn config(&self) -> &MqttTransportConfig {
        &self.config
    }

    /// Returns the client identifier of the live connection.
    #[must_use]
    pub fn client_id(&self) -> Option<String> {
        self.live.lock().as_ref().map(|live| live.client_id.clone())
    }

    /// Returns a handle to the client if the connection is live.
    fn live_client(&self) -> Option<AsyncClient> {
        self.live
            .lock()
            .as_ref()
            .filter(|live| live.is_connected())
            .map(|live| live.client.clone())
    }
}

impl Transport for MqttTransport {
    async fn connect(
        &self,
        address: &str,
        client_id: &str,
    ) -> Result<mpsc::Receiver<InboundMessage>, ProtocolError> {
        let (host, port) = parse_mqtt_url(address)?;

        // A connection whose event loop already died is never disconnected
        // by the caller; make sure its task is gone.
        let stale = self.live.lock().take();
        if let Some(stale) = stale {
            stale.task.abort();
        }

        let mut mqtt_options = MqttOptions::new(client_id, &host, port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        let (inbound_tx, inbound_rx) = mpsc::channel(self.config.inbound_capacity);
        let (connack_tx, connack_rx) = oneshot::channel();
        let connected = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(handle_connection_events(
            event_loop,
            Arc::clone(&connected),
            inbound_tx,
            connack_tx,
        ));

        let timeout = self.config.connection_timeout;
        let outcome = match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(reason))) => Err(ProtocolError::ConnectionFailed(reason)),
            Ok(Err(_)) => Err(ProtocolError::ConnectionFailed(
                "MQTT event loop terminated unexpectedly".to_string(),
            )),
            Err(_) => {
                // Safe: connection timeouts never approach u64::MAX milliseconds
                #[allow(clippy::cast_possible_truncation)]
                let timeout_ms = timeout.as_millis() as u64;
                Err(ProtocolError::Timeout(timeout_ms))
            }
        };

        if let Err(e) = outcome {
            task.abort();
            tracing::warn!(%host, %port, error = %e, "MQTT connection failed");
            return Err(e);
        }

        tracing::info!(%host, %port, %client_id, "Connected to MQTT broker");

        let superseded = self.live.lock().replace(LiveConnection {
            client,
            client_id: client_id.to_string(),
            connected,
            task,
        });

        // An overlapping connect finished first; only one connection may live.
        if let Some(superseded) = superseded {
            tracing::debug!(client_id = %superseded.client_id, "Dropping superseded MQTT connection");
            superseded.task.abort();
        }

        Ok(inbound_rx)
    }

    async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        let client = self.live_client().ok_or(ProtocolError::NotConnected)?;
        client.subscribe(topic, QoS::AtLeastOnce).await?;

        tracing::debug!(topic = %topic, "Subscribed to topic");
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), ProtocolError> {
        let client = self.live_client().ok_or(ProtocolError::NotConnected)?;

        tracing::debug!(topic = %topic, bytes = payload.len(), "Publishing MQTT message");

        client
            .publish(topic, QoS::AtLeastOnce, false, payload.to_vec())
            .await
            .map_err(ProtocolError::Mqtt)
    }

    async fn disconnect(&self) -> Result<(), ProtocolError> {
        let Some(live) = self.live.lock().take() else {
            return Ok(());
        };

        tracing::info!(client_id = %live.client_id, "Disconnecting from MQTT broker");

        let result = live.client.disconnect().await.map_err(ProtocolError::Mqtt);
        live.connected.store(false, Ordering::Release);

        let mut task = live.task;
        if tokio::time::timeout(DISCONNECT_GRACE, &mut task).await.is_err() {
            task.abort();
        }

        result
    }

    fn is_connected(&self) -> bool {
        self.live
            .lock()
            .as_ref()
            .is_some_and(LiveConnection::is_connected)
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        if let Some(live) = self.live.get_mut().take() {
            live.task.abort();
        }
    }
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport")
            .field("client_id", &self.client_id())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

/// Parses a broker URL into host and port.
///
/// Accepts `tcp://`, `mqtt://` or no scheme; the port defaults to 1883.
pub(crate) fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let trimmed = url.trim();
    let rest = trimmed
        .strip_prefix("mqtt://")
        .or_else(|| trimmed.strip_prefix("tcp://"))
        .unwrap_or(trimmed);
    let rest = rest.trim_end_matches('/');

    let (host, port) = if let Some((h, p)) = rest.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h, port)
    } else {
        (rest, 1883)
    };

    if host.is_empty() || host.contains("://") {
        return Err(ProtocolError::InvalidAddress(format!(
            "Invalid broker address: {url}"
        )));
    }

    Ok((host.to_string(), port))
}

/// Drives one connection's event loop until it ends.
///
/// The first CONNACK (or error before it) is reported through `connack_tx`.
async fn handle_connection_events(
    mut event_loop: EventLoop,
    connected: Arc<AtomicBool>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    connack_tx: oneshot::Sender<Result<(), String>>,
) {
    use rumqttc::{Event, Outgoing, Packet};

    let mut connack_tx = Some(connack_tx);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT broker connected");
                connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(Ok(()));
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::debug!(
                    topic = %publish.topic,
                    bytes = publish.payload.len(),
                    "MQTT message received"
                );
                let message = InboundMessage::new(publish.topic.clone(), publish.payload.to_vec());
                // Ignore send errors - the session may have stopped listening
                let _ = inbound_tx.send(message).await;
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker closed the connection");
                connected.store(false, Ordering::Release);
                break;
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::debug!("MQTT disconnect sent");
                connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                connected.store(false, Ordering::Release);
                match connack_tx.take() {
                    Some(tx) => {
                        let _ = tx.send(Err(e.to_string()));
                    }
                    None => tracing::error!(error = %e, "MQTT event loop error"),
                }
                break;
            }
        }
    }
}
