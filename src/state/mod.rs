// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! [`DeviceState`] is an immutable snapshot of what is known about the
//! device and its broker link. [`StateChange`] describes one transition, and
//! [`StateStore`] owns the current snapshot and publishes every new one to
//! its observers.
//!
//! # Examples
//!
//! ```
//! use homeguard_lib::state::{ConnectionStatus, StateStore};
//!
//! let store = StateStore::default();
//! store.apply_connection_status(ConnectionStatus::Connecting);
//!
//! let state = store.current();
//! assert_eq!(state.connection_status(), &ConnectionStatus::Connecting);
//! ```

mod connection_status;
mod device_state;
mod state_change;
mod store;

pub use connection_status::ConnectionStatus;
pub use device_state::{DEFAULT_BROKER_ADDRESS, DeviceState};
pub use state_change::StateChange;
pub use store::StateStore;
