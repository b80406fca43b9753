// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `HomeGuard` Lib - device-state sync for a home-security controller.
//!
//! This library keeps a local view of an MQTT-connected security device in
//! sync and sends it commands. The device reports telemetry as JSON on a
//! sensor topic and listens for plain-text commands on a command topic.
//!
//! # Supported Features
//!
//! - **Telemetry**: Temperature, humidity, motion, armed and alarm flags
//! - **Commands**: Arm/disarm toggle, light on/off
//! - **Connection management**: Status reporting, reconnect, broker change
//! - **Observable state**: Latest-value stream of immutable snapshots
//!
//! # Quick Start
//!
//! ```no_run
//! use homeguard_lib::{Session, SessionConfig};
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Returns (session, initial_connect) tuple
//!     let (session, initial) = Session::start(SessionConfig::default());
//!     initial.await.ok();
//!
//!     // Ask the device to arm or disarm
//!     session.dispatcher().toggle_arm();
//!
//!     let mut states = session.observe();
//!     while let Some(state) = states.next().await {
//!         println!("{} armed={}", state.status_text(), state.armed());
//!     }
//! }
//! ```
//!
//! ## Decoding Telemetry Directly
//!
//! ```
//! use homeguard_lib::decode;
//!
//! let reading = decode(br#"{"temp": "21.5", "motion": 1, "armed": true}"#).unwrap();
//! assert!(reading.motion);
//! assert!(reading.armed);
//! assert!(!reading.alarm);
//! ```

pub mod command;
pub mod error;
pub mod protocol;
pub mod session;
pub mod state;
pub mod telemetry;

pub use command::DeviceCommand;
pub use error::{DecodeError, Error, ParseError, ProtocolError, Result};
pub use protocol::{InboundMessage, MqttTransport, MqttTransportConfig, Transport};
pub use session::{CommandDispatcher, Session, SessionConfig, TransportSession};
pub use state::{ConnectionStatus, DeviceState, StateChange, StateStore};
pub use telemetry::{SensorReading, decode};
