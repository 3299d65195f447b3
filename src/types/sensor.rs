// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optional sensor readings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A sensor the device may report.
///
/// Not every model carries every sensor; absent readings stay absent on the
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    /// Indoor temperature in °C.
    InsideTemperature,
    /// Second indoor temperature probe in °C.
    InsideTemperature2,
    /// Outdoor temperature in °C.
    OutsideTemperature,
    /// Second outdoor temperature probe in °C.
    OutsideTemperature2,
    /// Relative humidity in %.
    Humidity,
    /// CO2 concentration in ppm.
    Co2,
    /// Volatile organic compounds in ppm.
    Voc,
    /// Atmospheric pressure in hPa.
    AirPressure,
}

impl Sensor {
    /// All sensors.
    pub const ALL: [Self; 8] = [
        Self::InsideTemperature,
        Self::InsideTemperature2,
        Self::OutsideTemperature,
        Self::OutsideTemperature2,
        Self::Humidity,
        Self::Co2,
        Self::Voc,
        Self::AirPressure,
    ];

    /// Returns the field name used in the device state payload.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::InsideTemperature => "inside_temperature",
            Self::InsideTemperature2 => "inside_temperature_2",
            Self::OutsideTemperature => "outside_temperature",
            Self::OutsideTemperature2 => "outside_temperature_2",
            Self::Humidity => "humidity",
            Self::Co2 => "co2",
            Self::Voc => "voc",
            Self::AirPressure => "air_pressure",
        }
    }

    /// Returns `true` for the temperature probes.
    #[must_use]
    pub const fn is_temperature(&self) -> bool {
        matches!(
            self,
            Self::InsideTemperature
                | Self::InsideTemperature2
                | Self::OutsideTemperature
                | Self::OutsideTemperature2
        )
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Sensor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sensor| sensor.key() == s)
            .ok_or_else(|| ValueError::UnknownSensor(s.to_string()))
    }
}
