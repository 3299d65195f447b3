// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named derivations over a snapshot.
//!
//! Consumers that render the device (sliders, switches, sensor tiles)
//! describe *what* they display with a [`Derivation`] instead of a closure,
//! which keeps their descriptions plain data that can be serialized,
//! compared and tested.
//!
//! # Examples
//!
//! ```
//! use prana_lib::state::{DeviceSnapshot, Derivation, DerivedValue};
//! use prana_lib::types::{Mode, Sensor, Subsystem};
//!
//! let snapshot = DeviceSnapshot::from_json(serde_json::json!({
//!     "supply": { "speed": 40, "is_on": true, "max_speed": 60 },
//!     "boost": true
//! }))
//! .unwrap();
//!
//! assert_eq!(
//!     snapshot.derive(Derivation::SpeedLevel(Subsystem::Supply)),
//!     Some(DerivedValue::Integer(4))
//! );
//! assert_eq!(
//!     snapshot.derive(Derivation::Flag(Mode::Boost)),
//!     Some(DerivedValue::Bool(true))
//! );
//! assert_eq!(snapshot.derive(Derivation::Sensor(Sensor::Co2)), None);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{Mode, Sensor, Subsystem};

use super::DeviceSnapshot;

/// What to read from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum Derivation {
    /// Speed level (0-6) of a subsystem.
    SpeedLevel(Subsystem),
    /// Speed percentage (0-100) of a subsystem.
    Percentage(Subsystem),
    /// Whether a subsystem's fan is running.
    FanOn(Subsystem),
    /// A mode flag.
    Flag(Mode),
    /// A sensor reading, absent when the device does not report it.
    Sensor(Sensor),
    /// Display brightness level (0-6).
    BrightnessLevel,
}

/// A value produced by a [`Derivation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DerivedValue {
    /// Whole number.
    Integer(i64),
    /// Real number.
    Float(f64),
    /// Boolean.
    Bool(bool),
}

impl DerivedValue {
    /// Returns the value as `f64`, booleans mapping to 0.0 / 1.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Integer(v) => v as f64,
            Self::Float(v) => v,
            Self::Bool(v) => f64::from(u8::from(v)),
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl DeviceSnapshot {
    /// Evaluates a derivation against this snapshot.
    ///
    /// Returns `None` only for sensors the device does not report.
    #[must_use]
    pub fn derive(&self, derivation: Derivation) -> Option<DerivedValue> {
        match derivation {
            Derivation::SpeedLevel(s) => {
                Some(DerivedValue::Integer(i64::from(self.speed_level(s).value())))
            }
            Derivation::Percentage(s) => Some(DerivedValue::Integer(i64::from(self.percentage(s)))),
            Derivation::FanOn(s) => Some(DerivedValue::Bool(self.is_on(s))),
            Derivation::Flag(mode) => Some(DerivedValue::Bool(self.mode(mode))),
            Derivation::Sensor(sensor) => self.sensors().get(sensor),
            Derivation::BrightnessLevel => Some(DerivedValue::Integer(i64::from(
                self.brightness_level().value(),
            ))),
        }
    }
}
