// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker connection status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection status of the broker link.
///
/// Transitions: `Disconnected -> Connecting -> Connected | Failed`, and back
/// to `Connecting` whenever the user retries or changes the broker address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No connection has been attempted, or the session was shut down.
    #[default]
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Connected to the broker.
    Connected,
    /// The last connection attempt failed.
    Failed(String),
}

impl ConnectionStatus {
    /// Returns true if the link is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if the last attempt failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Human-readable description shown next to the status indicator.
    #[must_use]
    pub fn describe(&self, broker_address: &str) -> String {
        match self {
            Self::Disconnected => "Disconnected".to_string(),
            Self::Connecting => format!("Connecting to {broker_address}..."),
            Self::Connected => "System online (MQTT)".to_string(),
            Self::Failed(reason) => format!("Connection failed: {reason}"),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_checks() {
        assert!(ConnectionStatus::Connected.is_connected());
        assert!(!ConnectionStatus::Connecting.is_connected());
        assert!(!ConnectionStatus::Disconnected.is_connected());

        let failed = ConnectionStatus::Failed("refused".to_string());
        assert!(failed.is_failed());
        assert_eq!(failed.failure_reason(), Some("refused"));
        assert_eq!(ConnectionStatus::Connected.failure_reason(), None);
    }

    #[test]
    fn describe_includes_context() {
        assert_eq!(
            ConnectionStatus::Connecting.describe("tcp://10.0.0.2:1883"),
            "Connecting to tcp://10.0.0.2:1883..."
        );
        assert_eq!(
            ConnectionStatus::Failed("timeout".to_string()).describe("ignored"),
            "Connection failed: timeout"
        );
        assert_eq!(ConnectionStatus::Connected.describe(""), "System online (MQTT)");
    }
}
