// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state model.
//!
//! [`DeviceSnapshot`] is an immutable capture of everything the device
//! reports. All helpers on it are pure: percentage conversion, on/off lookup
//! per subsystem, level mappings, and [`Derivation`]s for consumers that
//! describe what they display as data.
//!
//! # Examples
//!
//! ```
//! use prana_lib::state::DeviceSnapshot;
//! use prana_lib::types::Subsystem;
//!
//! let snapshot = DeviceSnapshot::from_body(
//!     r#"{"bounded": {"speed": 20, "is_on": true, "max_speed": 60}}"#,
//! )
//! .unwrap();
//!
//! assert!(snapshot.is_on(Subsystem::Bounded));
//! assert_eq!(snapshot.speed_level(Subsystem::Bounded).value(), 2);
//! ```

mod derivation;
mod snapshot;

pub use derivation::{Derivation, DerivedValue};
pub use snapshot::{DeviceSnapshot, ModeFlags, SensorReadings, SubsystemState};
