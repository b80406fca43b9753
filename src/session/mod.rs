// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session layer: connection lifecycle and user commands.
//!
//! A [`Session`] owns one [`StateStore`](crate::state::StateStore) and
//! keeps it in sync with the device:
//!
//! - [`TransportSession`] connects to the broker, subscribes to the sensor
//!   topic and feeds decoded telemetry into the store.
//! - [`CommandDispatcher`] turns user intents into local state changes and
//!   commands published on the command topic.
//!
//! # Examples
//!
//! ```no_run
//! use homeguard_lib::session::{Session, SessionConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = SessionConfig::default().with_broker_address("tcp://192.168.1.50:1883");
//! let (session, initial) = Session::start(config);
//! initial.await.ok();
//!
//! if session.current().connection_status().is_connected() {
//!     session.dispatcher().toggle_light().await.ok();
//! }
//!
//! session.shutdown().await;
//! # }
//! ```

mod config;
mod dispatcher;
mod handle;
mod transport_session;

pub use config::{
    DEFAULT_CLIENT_ID_PREFIX, DEFAULT_COMMAND_TOPIC, DEFAULT_SENSOR_TOPIC, SessionConfig,
};
pub use dispatcher::CommandDispatcher;
pub use handle::Session;
pub use transport_session::TransportSession;
