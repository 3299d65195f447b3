// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Immutable device state snapshot.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::ParseError;
use crate::types::{BrightnessLevel, Mode, Sensor, Speed, SpeedLevel, Subsystem};

use super::DerivedValue;

/// Default `max_speed` when the device omits it.
const DEFAULT_MAX_SPEED: u16 = 60;

/// Default raw brightness when the device omits it (level 6).
const DEFAULT_BRIGHTNESS: u16 = 32;

/// State of one airflow path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubsystemState {
    speed: u16,
    is_on: bool,
    max_speed: u16,
}

impl SubsystemState {
    /// Creates a subsystem state.
    ///
    /// `speed` is floored to a multiple of 10.
    #[must_use]
    pub fn new(speed: u16, is_on: bool, max_speed: u16) -> Self {
        let step = u16::from(Speed::STEP);
        Self {
            speed: speed - speed % step,
            is_on,
            max_speed,
        }
    }

    /// Native speed (multiple of 10).
    #[must_use]
    pub const fn speed(&self) -> u16 {
        self.speed
    }

    /// Whether the fan is running.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.is_on
    }

    /// Highest native speed reported by the device.
    #[must_use]
    pub const fn max_speed(&self) -> u16 {
        self.max_speed
    }

    /// Speed as a level (0-6).
    #[must_use]
    pub fn level(&self) -> SpeedLevel {
        SpeedLevel::from_raw(self.speed)
    }

    /// Speed as a percentage of `max_speed`, rounded.
    ///
    /// Returns 0 when `max_speed` is 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage(&self) -> u8 {
        if self.max_speed == 0 {
            return 0;
        }
        let pct = (f64::from(self.speed) / f64::from(self.max_speed) * 100.0).round();
        // Safe: clamped to [0, 100]
        pct.clamp(0.0, 100.0) as u8
    }
}

impl Default for SubsystemState {
    fn default() -> Self {
        Self {
            speed: 0,
            is_on: false,
            max_speed: DEFAULT_MAX_SPEED,
        }
    }
}

/// The seven boolean operating modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ModeFlags {
    /// Extract and supply linked.
    pub bound: bool,
    /// Heater enabled.
    pub heater: bool,
    /// Automatic speed.
    pub auto: bool,
    /// Automatic speed using air quality sensors.
    pub auto_plus: bool,
    /// Winter mode.
    pub winter: bool,
    /// Night mode.
    pub night: bool,
    /// Boost mode.
    pub boost: bool,
}

impl ModeFlags {
    /// Returns the flag for `mode`.
    #[must_use]
    pub const fn get(&self, mode: Mode) -> bool {
        match mode {
            Mode::Bound => self.bound,
            Mode::Heater => self.heater,
            Mode::Auto => self.auto,
            Mode::AutoPlus => self.auto_plus,
            Mode::Winter => self.winter,
            Mode::Night => self.night,
            Mode::Boost => self.boost,
        }
    }
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            bound: true,
            heater: false,
            auto: false,
            auto_plus: false,
            winter: false,
            night: false,
            boost: false,
        }
    }
}

/// Optional sensor readings, already converted to real units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorReadings {
    /// Indoor temperature in °C.
    pub inside_temperature: Option<f64>,
    /// Second indoor probe in °C.
    pub inside_temperature_2: Option<f64>,
    /// Outdoor temperature in °C.
    pub outside_temperature: Option<f64>,
    /// Second outdoor probe in °C.
    pub outside_temperature_2: Option<f64>,
    /// Relative humidity in %.
    pub humidity: Option<f64>,
    /// Atmospheric pressure in hPa.
    pub air_pressure: Option<f64>,
    /// CO2 in ppm.
    pub co2: Option<u32>,
    /// VOC in ppm.
    pub voc: Option<u32>,
}

impl SensorReadings {
    /// Returns the reading for `sensor`, if present.
    #[must_use]
    pub fn get(&self, sensor: Sensor) -> Option<DerivedValue> {
        match sensor {
            Sensor::InsideTemperature => self.inside_temperature.map(DerivedValue::Float),
            Sensor::InsideTemperature2 => self.inside_temperature_2.map(DerivedValue::Float),
            Sensor::OutsideTemperature => self.outside_temperature.map(DerivedValue::Float),
            Sensor::OutsideTemperature2 => self.outside_temperature_2.map(DerivedValue::Float),
            Sensor::Humidity => self.humidity.map(DerivedValue::Float),
            Sensor::AirPressure => self.air_pressure.map(DerivedValue::Float),
            Sensor::Co2 => self.co2.map(|v| DerivedValue::Integer(i64::from(v))),
            Sensor::Voc => self.voc.map(|v| DerivedValue::Integer(i64::from(v))),
        }
    }
}

/// Point-in-time capture of the full device state.
///
/// Snapshots are only created by parsing a device read response and are
/// never mutated; the coordinator replaces the whole snapshot on every
/// successful read.
///
/// # Examples
///
/// ```
/// use prana_lib::state::DeviceSnapshot;
/// use prana_lib::types::{Mode, Subsystem};
///
/// let snapshot = DeviceSnapshot::from_json(serde_json::json!({
///     "extract": { "speed": 30, "is_on": true, "max_speed": 60 },
///     "supply": { "speed": 60, "is_on": true, "max_speed": 60 },
///     "night": true,
///     "inside_temperature": 215
/// }))
/// .unwrap();
///
/// assert_eq!(snapshot.percentage(Subsystem::Extract), 50);
/// assert!(snapshot.mode(Mode::Night));
/// assert_eq!(snapshot.sensors().inside_temperature, Some(21.5));
/// assert_eq!(snapshot.sensors().co2, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    extract: SubsystemState,
    supply: SubsystemState,
    bounded: SubsystemState,
    modes: ModeFlags,
    brightness: u16,
    sensors: SensorReadings,
    received_at: DateTime<Utc>,
    #[serde(skip)]
    fetched_at: Instant,
    raw: serde_json::Value,
}

impl DeviceSnapshot {
    /// Parses a snapshot from the device's state payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if a field has the wrong type, or
    /// `ParseError::UnexpectedFormat` if the payload is not an object.
    pub fn from_json(raw: serde_json::Value) -> Result<Self, ParseError> {
        if !raw.is_object() {
            return Err(ParseError::UnexpectedFormat(format!(
                "expected a JSON object, got {raw}"
            )));
        }

        let wire = WireState::deserialize(&raw)?;

        let extract = wire.extract.into_state(Subsystem::Extract);
        let supply = wire.supply.into_state(Subsystem::Supply);
        let bounded = wire.bounded.into_state(Subsystem::Bounded);

        Ok(Self {
            extract,
            supply,
            bounded,
            modes: wire.modes,
            brightness: wire.brightness,
            sensors: SensorReadings {
                inside_temperature: wire.inside_temperature.map(tenths),
                inside_temperature_2: wire.inside_temperature_2.map(tenths),
                outside_temperature: wire.outside_temperature.map(tenths),
                outside_temperature_2: wire.outside_temperature_2.map(tenths),
                humidity: wire.humidity,
                air_pressure: wire.air_pressure,
                co2: wire.co2,
                voc: wire.voc,
            },
            received_at: Utc::now(),
            fetched_at: Instant::now(),
            raw,
        })
    }

    /// Parses a snapshot from a response body.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::EmptyBody` for an empty body, otherwise the
    /// errors of [`from_json`](Self::from_json).
    pub fn from_body(body: &str) -> Result<Self, ParseError> {
        if body.trim().is_empty() {
            return Err(ParseError::EmptyBody);
        }
        Self::from_json(serde_json::from_str(body)?)
    }

    /// Returns the state of one subsystem.
    #[must_use]
    pub const fn subsystem(&self, subsystem: Subsystem) -> &SubsystemState {
        match subsystem {
            Subsystem::Extract => &self.extract,
            Subsystem::Supply => &self.supply,
            Subsystem::Bounded => &self.bounded,
        }
    }

    /// Speed of `subsystem` as a percentage of its maximum (0-100).
    #[must_use]
    pub fn percentage(&self, subsystem: Subsystem) -> u8 {
        self.subsystem(subsystem).percentage()
    }

    /// Whether the fan of `subsystem` is running.
    #[must_use]
    pub const fn is_on(&self, subsystem: Subsystem) -> bool {
        self.subsystem(subsystem).is_on()
    }

    /// Speed of `subsystem` as a level (0-6).
    #[must_use]
    pub fn speed_level(&self, subsystem: Subsystem) -> SpeedLevel {
        self.subsystem(subsystem).level()
    }

    /// Returns all mode flags.
    #[must_use]
    pub const fn modes(&self) -> &ModeFlags {
        &self.modes
    }

    /// Returns one mode flag.
    #[must_use]
    pub const fn mode(&self, mode: Mode) -> bool {
        self.modes.get(mode)
    }

    /// Raw display brightness as reported by the device.
    #[must_use]
    pub const fn brightness(&self) -> u16 {
        self.brightness
    }

    /// Display brightness as a level.
    ///
    /// See [`BrightnessLevel::from_raw`] for the fallback applied to unknown
    /// raw values.
    #[must_use]
    pub fn brightness_level(&self) -> BrightnessLevel {
        BrightnessLevel::from_raw(self.brightness)
    }

    /// Returns the sensor readings.
    #[must_use]
    pub const fn sensors(&self) -> &SensorReadings {
        &self.sensors
    }

    /// Lists the sensors this device actually reports.
    #[must_use]
    pub fn available_sensors(&self) -> Vec<Sensor> {
        Sensor::ALL
            .into_iter()
            .filter(|&sensor| self.sensors.get(sensor).is_some())
            .collect()
    }

    /// Wall-clock time the payload was received.
    #[must_use]
    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Time elapsed since the payload was received.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// The payload exactly as the device sent it.
    #[must_use]
    pub const fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}

/// Converts the device's tenths-of-a-degree encoding.
fn tenths(value: f64) -> f64 {
    value / 10.0
}

#[derive(Deserialize)]
struct WireState {
    #[serde(default)]
    extract: WireSubsystem,
    #[serde(default)]
    supply: WireSubsystem,
    #[serde(default)]
    bounded: WireSubsystem,
    #[serde(flatten)]
    modes: ModeFlags,
    #[serde(default = "default_brightness")]
    brightness: u16,
    inside_temperature: Option<f64>,
    inside_temperature_2: Option<f64>,
    outside_temperature: Option<f64>,
    outside_temperature_2: Option<f64>,
    humidity: Option<f64>,
    air_pressure: Option<f64>,
    co2: Option<u32>,
    voc: Option<u32>,
}

fn default_brightness() -> u16 {
    DEFAULT_BRIGHTNESS
}

#[derive(Deserialize)]
#[serde(default)]
struct WireSubsystem {
    speed: u16,
    is_on: bool,
    max_speed: u16,
}

impl Default for WireSubsystem {
    fn default() -> Self {
        Self {
            speed: 0,
            is_on: false,
            max_speed: DEFAULT_MAX_SPEED,
        }
    }
}

impl WireSubsystem {
    fn into_state(self, subsystem: Subsystem) -> SubsystemState {
        if self.speed % u16::from(Speed::STEP) != 0 {
            tracing::warn!(
                %subsystem,
                speed = self.speed,
                "Device reported a speed that is not a multiple of 10, flooring"
            );
        }
        SubsystemState::new(self.speed, self.is_on, self.max_speed)
    }
}
