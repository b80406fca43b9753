// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for `pos_iot/sensor` telemetry payloads.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A sensor reading reported by the security device.
///
/// Every field has a default, so a reading can be built from a payload that
/// only carries some of them.
///
/// # Examples
///
/// ```
/// use homeguard_lib::telemetry::SensorReading;
///
/// let reading = SensorReading::default();
/// assert_eq!(reading.temperature, 0.0);
/// assert!(!reading.motion);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Temperature as reported by the device.
    pub temperature: f64,
    /// Relative humidity as reported by the device.
    pub humidity: f64,
    /// Whether the motion sensor is triggered.
    pub motion: bool,
    /// Whether the device reports itself as armed.
    pub armed: bool,
    /// Whether the alarm is sounding.
    pub alarm: bool,
}

/// Wire shape of a sensor payload.
///
/// Each field is read leniently: a missing, `null` or wrongly typed value
/// falls back to the default instead of failing the whole payload.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSensorPayload {
    #[serde(default, deserialize_with = "lenient_f64")]
    temp: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    humidity: f64,

    /// Integer flag; only `1` means motion.
    #[serde(default, deserialize_with = "lenient_motion")]
    motion: bool,

    #[serde(default, deserialize_with = "lenient_bool")]
    armed: bool,

    #[serde(default, deserialize_with = "lenient_bool")]
    alarm: bool,
}

impl From<RawSensorPayload> for SensorReading {
    fn from(raw: RawSensorPayload) -> Self {
        Self {
            temperature: raw.temp,
            humidity: raw.humidity,
            motion: raw.motion,
            armed: raw.armed,
            alarm: raw.alarm,
        }
    }
}

/// Reads a number, accepting numeric strings such as `"31.5"`.
fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value).unwrap_or(0.0))
}

fn lenient_motion<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    // Integer semantics: 1.7 truncates to 1.
    Ok(coerce_f64(&value).is_some_and(|v| (1.0..2.0).contains(&v)))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_bool(&value).unwrap_or(false))
}
