// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-intent entry points.

use tokio::task::JoinHandle;

use super::TransportSession;
use crate::command::DeviceCommand;
use crate::protocol::Transport;
use crate::state::StateChange;

/// Turns user intents into state changes and device commands.
///
/// Every method returns immediately. Network work runs on a spawned task
/// whose handle is returned; dropping the handle does not cancel it.
pub struct CommandDispatcher<T: Transport> {
    session: TransportSession<T>,
}

impl<T: Transport> Clone for CommandDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
        }
    }
}

impl<T: Transport> CommandDispatcher<T> {
    #[must_use]
    pub fn new(session: TransportSession<T>) -> Self {
        Self { session }
    }

    /// Asks the device to flip its armed state.
    ///
    /// The local armed flag is left alone; it follows the next telemetry
    /// report from the device.
    pub fn toggle_arm(&self) -> JoinHandle<()> {
        let armed = self.session.store().read(|state| state.armed());
        self.send(DeviceCommand::toggle_arm(armed))
    }

    /// Flips the light locally, then tells the device.
    ///
    /// The optimistic update stays even if the command never reaches the
    /// device.
    pub fn toggle_light(&self) -> JoinHandle<()> {
        let state = self
            .session
            .store()
            .update(|state| StateChange::Light(!state.light_on()));
        self.send(DeviceCommand::light(state.light_on()))
    }

    /// Stores a new broker address, closes the editor and reconnects.
    pub fn set_broker_address(&self, address: impl Into<String>) -> JoinHandle<()> {
        let address = address.into();
        tracing::info!(%address, "Broker address changed");

        self.session.store().apply(StateChange::Batch(vec![
            StateChange::BrokerAddress(address.clone()),
            StateChange::Configuring(false),
        ]));
        self.session.spawn_connect(address)
    }

    /// Reconnects to the stored broker address.
    pub fn retry_connection(&self) -> JoinHandle<()> {
        let address = self
            .session
            .store()
            .read(|state| state.broker_address().to_string());
        self.session.spawn_connect(address)
    }

    /// Shows or hides the broker-address editor. Returns the new value.
    pub fn toggle_configuring(&self) -> bool {
        self.session
            .store()
            .update(|state| StateChange::Configuring(!state.is_editing_config()))
            .is_editing_config()
    }

    /// Publishes `command` on the command topic.
    ///
    /// Skipped while disconnected. Publish failures are logged.
    pub fn send(&self, command: DeviceCommand) -> JoinHandle<()> {
        let session = self.session.clone();

        tokio::spawn(async move {
            let topic = session.config().command_topic();
            tracing::debug!(%command, %topic, "Sending command");

            if let Err(e) = session.publish(topic, command.payload().as_bytes()).await {
                tracing::warn!(%command, error = %e, "Command publish failed");
            }
        })
    }
}

impl<T: Transport> std::fmt::Debug for CommandDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("session", &self.session)
            .finish()
    }
}
