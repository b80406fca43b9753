// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state snapshot.

use serde::{Deserialize, Serialize};

use super::{ConnectionStatus, StateChange};

/// Broker used until the user picks another one.
pub const DEFAULT_BROKER_ADDRESS: &str = "tcp://broker.hivemq.com:1883";

/// Last-known condition of the security device and its broker link.
///
/// A `DeviceState` is an immutable snapshot. Changes are expressed as
/// [`StateChange`]s and [`applied`](Self::applied) to produce the next
/// snapshot, so observers holding an older one never see it change.
///
/// Sensor fields (`temperature`, `humidity`, `motion_detected`, `armed`,
/// `alarm_active`) only ever come from device telemetry. `light_on` is the
/// one field also set locally, ahead of the device's confirmation.
///
/// # Examples
///
/// ```
/// use homeguard_lib::state::{ConnectionStatus, DeviceState, StateChange};
///
/// let state = DeviceState::new();
/// let next = state.applied(&StateChange::Light(true));
///
/// assert!(!state.light_on());
/// assert!(next.light_on());
/// assert_eq!(next.connection_status(), &ConnectionStatus::Disconnected);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    temperature: f64,
    humidity: f64,
    motion_detected: bool,
    armed: bool,
    alarm_active: bool,
    light_on: bool,
    connection_status: ConnectionStatus,
    /// Description of `connection_status` rendered when it was applied.
    status_text: String,
    broker_address: String,
    is_editing_config: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::with_broker_address(DEFAULT_BROKER_ADDRESS)
    }
}

impl DeviceState {
    /// Creates a state with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default state targeting the given broker.
    #[must_use]
    pub fn with_broker_address(address: impl Into<String>) -> Self {
        let broker_address = address.into();
        let connection_status = ConnectionStatus::Disconnected;
        Self {
            temperature: 0.0,
            humidity: 0.0,
            motion_detected: false,
            armed: false,
            alarm_active: false,
            light_on: false,
            status_text: connection_status.describe(&broker_address),
            connection_status,
            broker_address,
            is_editing_config: false,
        }
    }

    /// Last reported temperature.
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Last reported relative humidity.
    #[must_use]
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    /// Whether the last telemetry reported motion.
    #[must_use]
    pub fn motion_detected(&self) -> bool {
        self.motion_detected
    }

    /// Arm state as last reported by the device.
    #[must_use]
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Whether the alarm is sounding.
    #[must_use]
    pub fn alarm_active(&self) -> bool {
        self.alarm_active
    }

    /// Light state, including unconfirmed local toggles.
    #[must_use]
    pub fn light_on(&self) -> bool {
        self.light_on
    }

    #[must_use]
    pub fn connection_status(&self) -> &ConnectionStatus {
        &self.connection_status
    }

    /// Human-readable connection status.
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Current or target broker URL.
    #[must_use]
    pub fn broker_address(&self) -> &str {
        &self.broker_address
    }

    /// Whether the broker-address editor should be shown.
    #[must_use]
    pub fn is_editing_config(&self) -> bool {
        self.is_editing_config
    }

    /// Returns the snapshot that results from applying `change`.
    ///
    /// `self` is left untouched.
    #[must_use]
    pub fn applied(&self, change: &StateChange) -> Self {
        let mut next = self.clone();
        next.merge(change);
        next
    }

    fn merge(&mut self, change: &StateChange) {
        match change {
            StateChange::Telemetry(reading) => {
                self.temperature = reading.temperature;
                self.humidity = reading.humidity;
                self.motion_detected = reading.motion;
                self.armed = reading.armed;
                self.alarm_active = reading.alarm;
            }
            StateChange::Connection(status) => {
                self.status_text = status.describe(&self.broker_address);
                self.connection_status = status.clone();
            }
            StateChange::Light(on) => self.light_on = *on,
            StateChange::BrokerAddress(address) => self.broker_address.clone_from(address),
            StateChange::Configuring(editing) => self.is_editing_config = *editing,
            StateChange::Batch(changes) => {
                for change in changes {
                    self.merge(change);
                }
            }
        }
    }
}
