// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the only way a [`DeviceState`](super::DeviceState)
//! evolves. They come from three sources:
//!
//! - inbound telemetry ([`StateChange::Telemetry`])
//! - the connection lifecycle ([`StateChange::Connection`])
//! - local user intents ([`StateChange::Light`], [`StateChange::BrokerAddress`],
//!   [`StateChange::Configuring`])
//!
//! # Examples
//!
//! ```
//! use homeguard_lib::state::{DeviceState, StateChange};
//!
//! let change = StateChange::Batch(vec![
//!     StateChange::BrokerAddress("tcp://192.168.1.20:1883".to_string()),
//!     StateChange::Configuring(false),
//! ]);
//!
//! let state = DeviceState::new().applied(&change);
//! assert_eq!(state.broker_address(), "tcp://192.168.1.20:1883");
//! ```

use serde::{Deserialize, Serialize};

use super::ConnectionStatus;
use crate::telemetry::SensorReading;

/// A transition of the device state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    /// A decoded telemetry message. Overwrites every sensor field.
    Telemetry(SensorReading),

    /// The broker link changed status.
    Connection(ConnectionStatus),

    /// Optimistic local light state, set before the device confirms.
    Light(bool),

    /// New target broker address.
    BrokerAddress(String),

    /// Show or hide the broker-address editor.
    Configuring(bool),

    /// Several changes published as one snapshot.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Returns true if this change only touches presentation-facing fields.
    ///
    /// Such changes never depend on the device or the broker.
    #[must_use]
    pub fn is_local(&self) -> bool {
        match self {
            Self::Light(_) | Self::BrokerAddress(_) | Self::Configuring(_) => true,
            Self::Telemetry(_) | Self::Connection(_) => false,
            Self::Batch(changes) => changes.iter().all(Self::is_local),
        }
    }
}

impl From<SensorReading> for StateChange {
    fn from(reading: SensorReading) -> Self {
        Self::Telemetry(reading)
    }
}

impl From<ConnectionStatus> for StateChange {
    fn from(status: ConnectionStatus) -> Self {
        Self::Connection(status)
    }
}
