// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable owner of the device state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::{ConnectionStatus, DeviceState, StateChange};
use crate::telemetry::SensorReading;

/// Single source of truth for the current [`DeviceState`].
///
/// Backed by a `tokio::sync::watch` channel: every update replaces the
/// stored snapshot, and observers always see the latest one. A slow observer
/// skips intermediate snapshots rather than building a backlog.
///
/// `StateStore` is cheaply cloneable; clones share the same state.
///
/// # Examples
///
/// ```
/// use homeguard_lib::state::StateStore;
///
/// let store = StateStore::default();
/// store.set_light_optimistic(true);
///
/// assert!(store.current().light_on());
/// ```
#[derive(Debug, Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<DeviceState>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(DeviceState::default())
    }
}

impl StateStore {
    /// Creates a store holding `initial`.
    #[must_use]
    pub fn new(initial: DeviceState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> DeviceState {
        self.tx.borrow().clone()
    }

    /// Returns a stream yielding the current state, then every later one.
    ///
    /// # Examples
    ///
    /// ```
    /// use homeguard_lib::state::StateStore;
    /// use tokio_stream::StreamExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let store = StateStore::default();
    /// let mut states = store.observe();
    ///
    /// let first = states.next().await.unwrap();
    /// assert!(!first.light_on());
    /// # }
    /// ```
    #[must_use]
    pub fn observe(&self) -> WatchStream<DeviceState> {
        WatchStream::new(self.tx.subscribe())
    }

    /// Returns a raw watch receiver for the state.
    ///
    /// The current value is marked as seen; `changed()` resolves on the next
    /// update.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<DeviceState> {
        self.tx.subscribe()
    }

    /// Returns the number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Reads the current state without cloning it.
    ///
    /// `f` runs while the state is borrowed; keep it short and do not call
    /// back into the store.
    pub fn read<R>(&self, f: impl FnOnce(&DeviceState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Applies a change and notifies observers.
    ///
    /// Returns true if the state actually changed. An identical snapshot is
    /// not re-broadcast.
    pub fn apply(&self, change: StateChange) -> bool {
        self.commit(|_| change).0
    }

    /// Derives a change from the current state and applies it atomically.
    ///
    /// Returns the resulting snapshot. No other write can slip in between
    /// reading the state and applying the change.
    ///
    /// # Examples
    ///
    /// ```
    /// use homeguard_lib::state::{StateChange, StateStore};
    ///
    /// let store = StateStore::default();
    /// let next = store.update(|state| StateChange::Light(!state.light_on()));
    /// assert!(next.light_on());
    /// ```
    pub fn update(&self, f: impl FnOnce(&DeviceState) -> StateChange) -> DeviceState {
        self.commit(f).1
    }

    fn commit(&self, f: impl FnOnce(&DeviceState) -> StateChange) -> (bool, DeviceState) {
        let mut committed = None;

        let changed = self.tx.send_if_modified(|state| {
            let change = f(state);
            let next = state.applied(&change);
            let changed = next != *state;
            if changed {
                tracing::trace!(local = change.is_local(), ?change, "Device state updated");
                *state = next;
            }
            committed = Some(state.clone());
            changed
        });

        let snapshot = committed.unwrap_or_else(|| self.current());
        (changed, snapshot)
    }

    /// Overwrites the sensor fields with a decoded reading.
    pub fn apply_telemetry(&self, reading: SensorReading) -> bool {
        self.apply(StateChange::Telemetry(reading))
    }

    pub fn apply_connection_status(&self, status: ConnectionStatus) -> bool {
        self.apply(StateChange::Connection(status))
    }

    /// Sets the light state ahead of device confirmation.
    pub fn set_light_optimistic(&self, on: bool) -> bool {
        self.apply(StateChange::Light(on))
    }

    pub fn set_broker_address(&self, address: impl Into<String>) -> bool {
        self.apply(StateChange::BrokerAddress(address.into()))
    }

    /// Shows or hides the broker-address editor.
    pub fn set_configuring(&self, editing: bool) -> bool {
        self.apply(StateChange::Configuring(editing))
    }
}
