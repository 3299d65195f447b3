// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Prana command definitions.
//!
//! Every state-changing request the device accepts is one variant of
//! [`Command`]. A command knows its endpoint, its JSON body, and whether a
//! snapshot already reflects it.
//!
//! | Command | Endpoint | Body |
//! |---------|----------|------|
//! | [`Command::SetSpeed`] | `setSpeed` | `{"speed": 30, "fanType": "supply"}` |
//! | [`Command::SetOn`] | `setSpeedIsOn` | `{"value": true, "fanType": "supply"}` |
//! | [`Command::SetMode`] | `setSwitch` | `{"switchType": "night", "value": true}` |
//! | [`Command::SetBrightness`] | `setBrightness` | `{"brightness": 8}` |
//!
//! # Examples
//!
//! ```
//! use prana_lib::command::Command;
//! use prana_lib::types::{Speed, Subsystem};
//!
//! let cmd = Command::SetSpeed {
//!     speed: Speed::new(30).unwrap(),
//!     subsystem: Subsystem::Supply,
//! };
//!
//! assert_eq!(cmd.endpoint(), "setSpeed");
//! assert_eq!(
//!     cmd.body(),
//!     serde_json::json!({ "speed": 30, "fanType": "supply" })
//! );
//! ```

use std::fmt;

use serde_json::{Value, json};

use crate::state::DeviceSnapshot;
use crate::types::{Brightness, Mode, Speed, Subsystem};

/// A state-changing request to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Set the native speed of one subsystem.
    SetSpeed {
        /// Target speed.
        speed: Speed,
        /// Target subsystem.
        subsystem: Subsystem,
    },
    /// Turn one subsystem's fan on or off.
    SetOn {
        /// Target power state.
        on: bool,
        /// Target subsystem.
        subsystem: Subsystem,
    },
    /// Enable or disable a mode.
    SetMode {
        /// Target mode.
        mode: Mode,
        /// Target state.
        on: bool,
    },
    /// Set the display brightness.
    SetBrightness(Brightness),
}

impl Command {
    /// Returns the endpoint path, without leading slash.
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::SetSpeed { .. } => "setSpeed",
            Self::SetOn { .. } => "setSpeedIsOn",
            Self::SetMode { .. } => "setSwitch",
            Self::SetBrightness(_) => "setBrightness",
        }
    }

    /// Returns the JSON request body.
    #[must_use]
    pub fn body(&self) -> Value {
        match *self {
            Self::SetSpeed { speed, subsystem } => {
                json!({ "speed": speed.value(), "fanType": subsystem.as_str() })
            }
            Self::SetOn { on, subsystem } => {
                json!({ "value": on, "fanType": subsystem.as_str() })
            }
            Self::SetMode { mode, on } => json!({ "switchType": mode.as_str(), "value": on }),
            Self::SetBrightness(brightness) => json!({ "brightness": brightness.value() }),
        }
    }

    /// Returns `true` if `snapshot` already shows the state this command
    /// would produce.
    #[must_use]
    pub fn is_satisfied_by(&self, snapshot: &DeviceSnapshot) -> bool {
        match *self {
            Self::SetSpeed { speed, subsystem } => {
                snapshot.subsystem(subsystem).speed() == u16::from(speed)
            }
            Self::SetOn { on, subsystem } => snapshot.is_on(subsystem) == on,
            Self::SetMode { mode, on } => snapshot.mode(mode) == on,
            Self::SetBrightness(brightness) => snapshot.brightness() == u16::from(brightness),
        }
    }

    /// Returns the current value of the field this command targets, for
    /// diagnostics.
    #[must_use]
    pub fn current_value(&self, snapshot: &DeviceSnapshot) -> Value {
        match *self {
            Self::SetSpeed { subsystem, .. } => json!(snapshot.subsystem(subsystem).speed()),
            Self::SetOn { subsystem, .. } => json!(snapshot.is_on(subsystem)),
            Self::SetMode { mode, .. } => json!(snapshot.mode(mode)),
            Self::SetBrightness(_) => json!(snapshot.brightness()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetSpeed { speed, subsystem } => write!(f, "set {subsystem} speed to {speed}"),
            Self::SetOn { on, subsystem } => {
                write!(f, "turn {subsystem} fan {}", if *on { "on" } else { "off" })
            }
            Self::SetMode { mode, on } => {
                write!(f, "{} {mode} mode", if *on { "enable" } else { "disable" })
            }
            Self::SetBrightness(brightness) => write!(f, "set brightness to {brightness}"),
        }
    }
}
