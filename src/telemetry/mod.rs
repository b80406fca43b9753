// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry decoding for the security device.
//!
//! The device publishes a flat JSON object on the sensor topic:
//!
//! ```json
//! {"temp": 21.5, "humidity": 40, "motion": 0, "armed": true, "alarm": false}
//! ```
//!
//! All fields are optional. Absent or malformed fields take their defaults;
//! only a payload that is not a JSON object at all is rejected.
//!
//! # Examples
//!
//! ```
//! use homeguard_lib::telemetry::decode;
//!
//! let reading = decode(br#"{"temp": 31.5}"#).unwrap();
//! assert_eq!(reading.temperature, 31.5);
//! assert!(!reading.armed);
//!
//! assert!(decode(b"not json").is_err());
//! ```

mod sensor_parser;

pub use sensor_parser::SensorReading;

use serde_json::Value;

use crate::error::DecodeError;
use sensor_parser::RawSensorPayload;

/// Decodes a raw sensor payload into a [`SensorReading`].
///
/// # Errors
///
/// Returns `DecodeError` if the payload is not UTF-8, not JSON, or not a
/// JSON object. Field-level problems never produce an error.
pub fn decode(payload: &[u8]) -> Result<SensorReading, DecodeError> {
    let text = std::str::from_utf8(payload)?;
    let value: Value = serde_json::from_str(text)?;

    if !value.is_object() {
        return Err(DecodeError::NotAnObject(json_kind(&value)));
    }

    let raw: RawSensorPayload = serde_json::from_value(value)?;
    Ok(raw.into())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
