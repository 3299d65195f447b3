// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Airflow subsystems and operating modes.
//!
//! A Prana recuperator has three independently controllable airflow paths
//! and seven named boolean operating modes. Both are closed sets, so they are
//! modelled as enums; parsing an unknown name fails with a [`ValueError`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// One of the three airflow paths of the device.
///
/// The device API calls this the "fan type".
///
/// # Examples
///
/// ```
/// use prana_lib::types::Subsystem;
///
/// let s: Subsystem = "supply".parse().unwrap();
/// assert_eq!(s, Subsystem::Supply);
/// assert_eq!(Subsystem::Bounded.as_str(), "bounded");
/// assert!("intake".parse::<Subsystem>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// Exhaust fan, moving air out of the room.
    Extract,
    /// Intake fan, moving fresh air in.
    Supply,
    /// Both fans driven together (recuperator mode).
    Bounded,
}

impl Subsystem {
    /// All subsystems, in device order.
    pub const ALL: [Self; 3] = [Self::Extract, Self::Supply, Self::Bounded];

    /// Returns the name used by the device API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Supply => "supply",
            Self::Bounded => "bounded",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subsystem {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|subsystem| subsystem.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValueError::UnknownSubsystem(s.to_string()))
    }
}

/// A named boolean operating mode of the device.
///
/// The device API calls this the "switch type".
///
/// # Examples
///
/// ```
/// use prana_lib::types::Mode;
///
/// assert_eq!("auto_plus".parse::<Mode>().unwrap(), Mode::AutoPlus);
/// assert_eq!(Mode::Night.as_str(), "night");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Extract and supply fans are linked.
    Bound,
    /// Intake air heater.
    Heater,
    /// Automatic speed control.
    Auto,
    /// Automatic speed control using air quality sensors.
    AutoPlus,
    /// Winter (anti-freeze) mode.
    Winter,
    /// Quiet night mode.
    Night,
    /// Temporary maximum airflow.
    Boost,
}

impl Mode {
    /// All modes.
    pub const ALL: [Self; 7] = [
        Self::Bound,
        Self::Heater,
        Self::Auto,
        Self::AutoPlus,
        Self::Winter,
        Self::Night,
        Self::Boost,
    ];

    /// Returns the name used by the device API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bound => "bound",
            Self::Heater => "heater",
            Self::Auto => "auto",
            Self::AutoPlus => "auto_plus",
            Self::Winter => "winter",
            Self::Night => "night",
            Self::Boost => "boost",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValueError::UnknownMode(s.to_string()))
    }
}
