// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-level session handle.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

use super::{CommandDispatcher, SessionConfig, TransportSession};
use crate::protocol::{MqttTransport, Transport};
use crate::state::{DeviceState, StateStore};

/// A running device session.
///
/// Wires a [`StateStore`], a [`TransportSession`] and a
/// [`CommandDispatcher`] together and starts the initial connection.
///
/// # Examples
///
/// ```no_run
/// use homeguard_lib::{Session, SessionConfig};
/// use tokio_stream::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() {
/// let (session, initial) = Session::start(SessionConfig::default());
/// initial.await.ok();
///
/// let mut states = session.observe();
/// while let Some(state) = states.next().await {
///     println!("{}: {:.1} C", state.status_text(), state.temperature());
/// }
/// # }
/// ```
pub struct Session<T: Transport = MqttTransport> {
    store: StateStore,
    transport_session: TransportSession<T>,
    dispatcher: CommandDispatcher<T>,
}

impl<T: Transport> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            transport_session: self.transport_session.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl Session<MqttTransport> {
    /// Starts a session over MQTT.
    ///
    /// Returns the session together with the handle of the initial
    /// connection attempt. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn start(config: SessionConfig) -> (Self, JoinHandle<()>) {
        let transport = MqttTransport::with_config(config.transport_config().clone());
        Self::with_transport(config, Arc::new(transport))
    }
}

impl<T: Transport> Session<T> {
    /// Starts a session over a caller-provided transport.
    #[must_use]
    pub fn with_transport(config: SessionConfig, transport: Arc<T>) -> (Self, JoinHandle<()>) {
        let address = config.broker_address().to_string();
        let store = StateStore::new(DeviceState::with_broker_address(&address));
        let transport_session = TransportSession::new(transport, store.clone(), config);
        let dispatcher = CommandDispatcher::new(transport_session.clone());

        let initial = transport_session.spawn_connect(address);

        let session = Self {
            store,
            transport_session,
            dispatcher,
        };
        (session, initial)
    }

    #[must_use]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    #[must_use]
    pub fn dispatcher(&self) -> &CommandDispatcher<T> {
        &self.dispatcher
    }

    #[must_use]
    pub fn transport_session(&self) -> &TransportSession<T> {
        &self.transport_session
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> DeviceState {
        self.store.current()
    }

    /// Returns a stream of states, starting with the current one.
    #[must_use]
    pub fn observe(&self) -> WatchStream<DeviceState> {
        self.store.observe()
    }

    /// Disconnects from the broker.
    pub async fn shutdown(&self) {
        if let Err(e) = self.transport_session.disconnect().await {
            tracing::warn!(error = %e, "Disconnect during shutdown failed");
        }
        tracing::info!("Session shut down");
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.store.current())
            .finish_non_exhaustive()
    }
}
