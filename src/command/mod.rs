// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device command definitions.
//!
//! Commands are published as plain UTF-8 text on the command topic. The
//! device answers indirectly: its next telemetry message reports the
//! resulting state.
//!
//! | Command | Payload |
//! |---------|---------|
//! | [`DeviceCommand::Arm`] | `ARM` |
//! | [`DeviceCommand::Disarm`] | `DISARM` |
//! | [`DeviceCommand::LightOn`] | `LIGHT_ON` |
//! | [`DeviceCommand::LightOff`] | `LIGHT_OFF` |
//!
//! # Examples
//!
//! ```
//! use homeguard_lib::command::DeviceCommand;
//!
//! let cmd = DeviceCommand::toggle_arm(false);
//! assert_eq!(cmd, DeviceCommand::Arm);
//! assert_eq!(cmd.payload(), "ARM");
//!
//! let parsed: DeviceCommand = "LIGHT_OFF".parse().unwrap();
//! assert_eq!(parsed, DeviceCommand::LightOff);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A command that can be sent to the security device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    /// Arm the alarm system.
    Arm,
    /// Disarm the alarm system.
    Disarm,
    /// Switch the light on.
    LightOn,
    /// Switch the light off.
    LightOff,
}

impl DeviceCommand {
    /// Returns the command that flips the given arm state.
    ///
    /// An unarmed system gets [`Arm`](Self::Arm), an armed one gets
    /// [`Disarm`](Self::Disarm).
    #[must_use]
    pub const fn toggle_arm(currently_armed: bool) -> Self {
        if currently_armed {
            Self::Disarm
        } else {
            Self::Arm
        }
    }

    /// Returns the command that sets the light to the given state.
    #[must_use]
    pub const fn light(on: bool) -> Self {
        if on { Self::LightOn } else { Self::LightOff }
    }

    /// Returns the wire payload for this command.
    #[must_use]
    pub const fn payload(&self) -> &'static str {
        match self {
            Self::Arm => "ARM",
            Self::Disarm => "DISARM",
            Self::LightOn => "LIGHT_ON",
            Self::LightOff => "LIGHT_OFF",
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payload())
    }
}

impl FromStr for DeviceCommand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ARM" => Ok(Self::Arm),
            "DISARM" => Ok(Self::Disarm),
            "LIGHT_ON" => Ok(Self::LightOn),
            "LIGHT_OFF" => Ok(Self::LightOff),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_arm_picks_opposite() {
        assert_eq!(DeviceCommand::toggle_arm(false), DeviceCommand::Arm);
        assert_eq!(DeviceCommand::toggle_arm(true), DeviceCommand::Disarm);
    }

    #[test]
    fn light_command_matches_target() {
        assert_eq!(DeviceCommand::light(true), DeviceCommand::LightOn);
        assert_eq!(DeviceCommand::light(false), DeviceCommand::LightOff);
    }

    #[test]
    fn payloads() {
        assert_eq!(DeviceCommand::Arm.payload(), "ARM");
        assert_eq!(DeviceCommand::Disarm.payload(), "DISARM");
        assert_eq!(DeviceCommand::LightOn.payload(), "LIGHT_ON");
        assert_eq!(DeviceCommand::LightOff.to_string(), "LIGHT_OFF");
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(" DISARM\n".parse::<DeviceCommand>(), Ok(DeviceCommand::Disarm));
    }

    #[test]
    fn parse_is_case_sensitive() {
        let err = "arm".parse::<DeviceCommand>().unwrap_err();
        assert_eq!(err, ParseError::UnknownCommand("arm".to_string()));
    }
}
