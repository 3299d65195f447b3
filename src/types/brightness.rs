// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display brightness types.
//!
//! The device encodes display brightness as a power of two (plus zero for
//! "off"). User-facing controls use levels 0-6, mapped one-to-one:
//!
//! | Level | Raw |
//! |-------|-----|
//! | 0     | 0   |
//! | 1     | 1   |
//! | 2     | 2   |
//! | 3     | 4   |
//! | 4     | 8   |
//! | 5     | 16  |
//! | 6     | 32  |

use std::fmt;

use crate::error::ValueError;

const RAW_VALUES: [u8; 7] = [0, 1, 2, 4, 8, 16, 32];

/// Raw display brightness as sent to the device.
///
/// # Examples
///
/// ```
/// use prana_lib::types::Brightness;
///
/// let b = Brightness::new(8).unwrap();
/// assert_eq!(b.level().value(), 4);
/// assert!(Brightness::new(3).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct Brightness(u8);

impl Brightness {
    /// Display off.
    pub const OFF: Self = Self(0);

    /// Brightest setting.
    pub const MAX: Self = Self(32);

    /// Creates a raw brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidBrightness` unless `value` is one of
    /// 0, 1, 2, 4, 8, 16, 32.
    pub fn new(value: u16) -> Result<Self, ValueError> {
        u8::try_from(value)
            .ok()
            .filter(|v| RAW_VALUES.contains(v))
            .map(Self)
            .ok_or(ValueError::InvalidBrightness(value))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the corresponding level.
    #[must_use]
    pub fn level(&self) -> BrightnessLevel {
        BrightnessLevel::from_raw(u16::from(self.0))
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Brightness {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Brightness> for u16 {
    fn from(brightness: Brightness) -> Self {
        Self::from(brightness.0)
    }
}

/// User-facing display brightness level (0-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct BrightnessLevel(u8);

impl BrightnessLevel {
    /// Display off.
    pub const MIN: Self = Self(0);

    /// Brightest level.
    pub const MAX: Self = Self(6);

    /// Creates a brightness level.
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

    /// Maps a raw value reported by the device back to a level.
    ///
    /// This is lossy: a raw value outside the known set (firmware quirk or
    /// a value set by another client) maps to [`BrightnessLevel::MAX`]. The
    /// original raw value is still available on the snapshot.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        RAW_VALUES
            .iter()
            .position(|&v| u16::from(v) == raw)
            .and_then(|i| u8::try_from(i).ok())
            .map_or(Self::MAX, Self)
    }

    /// Returns the level value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Converts this level to the raw value sent to the device.
    #[must_use]
    pub const fn to_brightness(&self) -> Brightness {
        Brightness(RAW_VALUES[self.0 as usize])
    }
}

impl fmt::Display for BrightnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for BrightnessLevel {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
