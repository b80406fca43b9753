// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration.

use crate::protocol::MqttTransportConfig;
use crate::state::DEFAULT_BROKER_ADDRESS;

/// Topic the device publishes telemetry on.
pub const DEFAULT_SENSOR_TOPIC: &str = "pos_iot/sensor";

/// Topic the device listens to for commands.
pub const DEFAULT_COMMAND_TOPIC: &str = "pos_iot/command";

/// Prefix of generated client identifiers.
pub const DEFAULT_CLIENT_ID_PREFIX: &str = "android_";

/// Configuration for a [`Session`](super::Session).
///
/// # Examples
///
/// ```
/// use homeguard_lib::session::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_broker_address("tcp://192.168.1.50:1883")
///     .with_client_id_prefix("dashboard_");
///
/// assert_eq!(config.broker_address(), "tcp://192.168.1.50:1883");
/// assert_eq!(config.sensor_topic(), "pos_iot/sensor");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    broker_address: String,
    sensor_topic: String,
    command_topic: String,
    client_id_prefix: String,
    subscribe_failure_as_failed: bool,
    transport: MqttTransportConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            broker_address: DEFAULT_BROKER_ADDRESS.to_string(),
            sensor_topic: DEFAULT_SENSOR_TOPIC.to_string(),
            command_topic: DEFAULT_COMMAND_TOPIC.to_string(),
            client_id_prefix: DEFAULT_CLIENT_ID_PREFIX.to_string(),
            subscribe_failure_as_failed: false,
            transport: MqttTransportConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Sets the broker the session connects to at startup.
    #[must_use]
    pub fn with_broker_address(mut self, address: impl Into<String>) -> Self {
        self.broker_address = address.into();
        self
    }

    /// Sets the telemetry topic.
    #[must_use]
    pub fn with_sensor_topic(mut self, topic: impl Into<String>) -> Self {
        self.sensor_topic = topic.into();
        self
    }

    /// Sets the command topic.
    #[must_use]
    pub fn with_command_topic(mut self, topic: impl Into<String>) -> Self {
        self.command_topic = topic.into();
        self
    }

    /// Sets the prefix of generated client identifiers.
    #[must_use]
    pub fn with_client_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.client_id_prefix = prefix.into();
        self
    }

    /// Reports a failed sensor subscription as a failed connection.
    ///
    /// Off by default: the status stays `Connected` even though no
    /// telemetry will arrive.
    #[must_use]
    pub fn with_subscribe_failure_as_failed(mut self, enabled: bool) -> Self {
        self.subscribe_failure_as_failed = enabled;
        self
    }

    /// Sets the MQTT transport configuration used by [`Session::start`](super::Session::start).
    #[must_use]
    pub fn with_transport_config(mut self, config: MqttTransportConfig) -> Self {
        self.transport = config;
        self
    }

    #[must_use]
    pub fn broker_address(&self) -> &str {
        &self.broker_address
    }

    #[must_use]
    pub fn sensor_topic(&self) -> &str {
        &self.sensor_topic
    }

    #[must_use]
    pub fn command_topic(&self) -> &str {
        &self.command_topic
    }

    #[must_use]
    pub fn client_id_prefix(&self) -> &str {
        &self.client_id_prefix
    }

    #[must_use]
    pub fn subscribe_failure_as_failed(&self) -> bool {
        self.subscribe_failure_as_failed
    }

    #[must_use]
    pub fn transport_config(&self) -> &MqttTransportConfig {
        &self.transport
    }
}
