// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed types.
//!
//! The device speaks a native scale of 0-60 in steps of 10. User-facing
//! controls use levels 0-6. The mapping is `raw = level * 10` and
//! `level = raw / 10`.

use std::fmt;

use crate::error::ValueError;

/// Native fan speed as sent to the device (0, 10, ..., 60).
///
/// # Examples
///
/// ```
/// use prana_lib::types::Speed;
///
/// let speed = Speed::new(30).unwrap();
/// assert_eq!(speed.value(), 30);
/// assert_eq!(speed.level().value(), 3);
///
/// assert!(Speed::new(35).is_err());
/// assert!(Speed::new(70).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct Speed(u8);

impl Speed {
    /// Step between consecutive native speeds.
    pub const STEP: u8 = 10;

    /// Highest native speed accepted by the device.
    pub const MAX_VALUE: u8 = 60;

    /// Fan stopped.
    pub const OFF: Self = Self(0);

    /// Full speed.
    pub const MAX: Self = Self(Self::MAX_VALUE);

    /// Creates a native speed value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidSpeed` unless `value` is one of
    /// 0, 10, 20, 30, 40, 50, 60.
    pub fn new(value: u16) -> Result<Self, ValueError> {
        match u8::try_from(value) {
            Ok(v) if v <= Self::MAX_VALUE && v % Self::STEP == 0 => Ok(Self(v)),
            _ => Err(ValueError::InvalidSpeed(value)),
        }
    }

    /// Returns the native value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the corresponding user-facing level.
    #[must_use]
    pub const fn level(&self) -> SpeedLevel {
        SpeedLevel(self.0 / Self::STEP)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Speed {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Speed> for u16 {
    fn from(speed: Speed) -> Self {
        Self::from(speed.0)
    }
}

/// User-facing speed level (0-6).
///
/// # Examples
///
/// ```
/// use prana_lib::types::SpeedLevel;
///
/// let level = SpeedLevel::new(4).unwrap();
/// assert_eq!(level.to_speed().value(), 40);
/// assert_eq!(SpeedLevel::from_raw(25).value(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    /// Fan stopped.
    pub const MIN: Self = Self(0);

    /// Highest level.
    pub const MAX: Self = Self(6);

    /// Creates a speed level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `level` exceeds 6.
    pub fn new(level: u8) -> Result<Self, ValueError> {
        if level > Self::MAX.0 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(Self::MAX.0),
                actual: u16::from(level),
            });
        }
        Ok(Self(level))
    }

    /// Derives a level from a native speed reported by the device.
    ///
    /// Uses integer division, so a value that is not a multiple of 10 rounds
    /// down. Values above 60 saturate at level 6.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        let level = raw / u16::from(Speed::STEP);
        Self(u8::try_from(level).unwrap_or(u8::MAX).min(Self::MAX.0))
    }

    /// Returns the level value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` for level 0.
    #[must_use]
    pub const fn is_off(&self) -> bool {
        self.0 == 0
    }

    /// Converts this level to the native speed sent to the device.
    #[must_use]
    pub const fn to_speed(&self) -> Speed {
        Speed(self.0 * Speed::STEP)
    }
}

impl fmt::Display for SpeedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for SpeedLevel {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
