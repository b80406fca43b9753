// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `HomeGuard` library.
//!
//! Transport operations return these errors explicitly. The session layer
//! decides which of them degrade into a connection status and which are
//! only logged.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to the broker.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while decoding a telemetry payload.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error occurred while parsing a command string.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to broker communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client rejected a request.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// There is no live broker connection.
    #[error("not connected to a broker")]
    NotConnected,
}

/// Errors produced when an inbound telemetry payload cannot be decoded at all.
///
/// Individual fields never cause these errors; a missing or wrongly typed
/// field falls back to its default.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not valid UTF-8 text.
    #[error("payload is not UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Payload is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is valid JSON but not an object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Errors related to parsing command strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The string is not one of the known device commands.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::InvalidAddress("Invalid port: abc".to_string());
        assert_eq!(err.to_string(), "invalid address: Invalid port: abc");
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::NotAnObject("array");
        assert_eq!(err.to_string(), "expected a JSON object, got array");
    }

    #[test]
    fn error_from_protocol_error() {
        let err: Error = ProtocolError::NotConnected.into();
        assert!(matches!(err, Error::Protocol(ProtocolError::NotConnected)));
        assert_eq!(err.to_string(), "protocol error: not connected to a broker");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::UnknownCommand("SELF_DESTRUCT".to_string());
        assert_eq!(err.to_string(), "unknown command: SELF_DESTRUCT");
    }
}
