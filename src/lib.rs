// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `prana_lib` - A Rust library to control Prana recuperators.
//!
//! Prana recuperators are heat-recovery ventilation units with a local HTTP
//! API. This library provides a typed client for that API and a coordinator
//! that keeps one consistent cached view of the device while several
//! consumers poll and command it.
//!
//! # Supported Features
//!
//! - **Fan control**: speed and power of the extract, supply and bounded fans
//! - **Modes**: heater, night, boost, winter, auto and friends
//! - **Display**: brightness levels
//! - **Sensors**: temperatures, humidity, CO2, VOC and air pressure
//!
//! # Quick Start
//!
//! ## Direct device access
//!
//! ```no_run
//! use prana_lib::Device;
//! use prana_lib::types::{Speed, Subsystem};
//!
//! #[tokio::main]
//! async fn main() -> prana_lib::Result<()> {
//!     let device = Device::http("192.168.1.40")?;
//!
//!     let state = device.read_state().await?;
//!     println!("extract fan on: {}", state.is_on(Subsystem::Extract));
//!
//!     device.set_speed(Speed::new(40)?, Subsystem::Extract).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Coordinated access
//!
//! Several consumers sharing one device should go through a
//! [`Coordinator`]: it serializes requests, retries transient failures and
//! re-reads the state after every write.
//!
//! ```no_run
//! use std::sync::Arc;
//! use prana_lib::types::{Mode, Subsystem};
//! use prana_lib::{Coordinator, CoordinatorConfig, Device};
//!
//! #[tokio::main]
//! async fn main() -> prana_lib::Result<()> {
//!     let device = Device::http("192.168.1.40")?;
//!     let coordinator = Arc::new(Coordinator::new(device, CoordinatorConfig::new("Hall")));
//!
//!     coordinator.first_refresh().await?;
//!     let poller = coordinator.spawn_poller();
//!
//!     coordinator.request_fan_level(3, Subsystem::Supply).await?;
//!     coordinator.request_switch(Mode::Heater, true).await?;
//!
//!     if let Some(snapshot) = coordinator.current_snapshot() {
//!         println!("supply at {}%", snapshot.percentage(Subsystem::Supply));
//!     }
//!
//!     poller.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod coordinator;
mod device;
pub mod error;
pub mod event;
pub mod protocol;
pub mod state;
pub mod types;

pub use command::Command;
pub use coordinator::{
    CommandOutcome, Coordinator, CoordinatorConfig, CoordinatorState, PollerHandle,
    PowerOrdering, RetryPolicy,
};
pub use device::{Device, DeviceApi};
pub use error::{Error, ErrorKind, ParseError, ProtocolError, Result, ValueError};
pub use event::CoordinatorEvent;
pub use protocol::HttpConfig;
pub use state::{Derivation, DerivedValue, DeviceSnapshot};
pub use types::{Brightness, BrightnessLevel, Mode, Sensor, Speed, SpeedLevel, Subsystem};
