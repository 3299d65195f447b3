// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Prana device control.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so invalid arguments are rejected before any request is sent.
//!
//! # Types
//!
//! - [`Subsystem`] - Extract, supply or bounded airflow path
//! - [`Mode`] - One of the seven boolean operating modes
//! - [`Speed`] / [`SpeedLevel`] - Native speed (0-60 by 10) and level (0-6)
//! - [`Brightness`] / [`BrightnessLevel`] - Raw display brightness and level (0-6)
//! - [`Sensor`] - Optional sensor readings

mod brightness;
mod sensor;
mod speed;
mod subsystem;

pub use brightness::{Brightness, BrightnessLevel};
pub use sensor::Sensor;
pub use speed::{Speed, SpeedLevel};
pub use subsystem::{Mode, Subsystem};
