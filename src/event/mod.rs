// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for coordinator activity.
//!
//! A [`Coordinator`](crate::Coordinator) publishes a [`CoordinatorEvent`] on
//! every refresh and command outcome. Consumers that prefer to wait on the
//! latest snapshot alone can use `Coordinator::watch` instead.
//!
//! ```no_run
//! use prana_lib::event::CoordinatorEvent;
//! use prana_lib::{Coordinator, CoordinatorConfig, Device};
//!
//! # async fn example() -> prana_lib::Result<()> {
//! let coordinator = Coordinator::new(Device::http("192.168.1.40")?, CoordinatorConfig::default());
//! let mut events = coordinator.subscribe();
//!
//! while let Ok(event) = events.recv().await {
//!     if let CoordinatorEvent::Updated { snapshot } = event {
//!         println!("brightness {}", snapshot.brightness());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod coordinator_event;
mod event_bus;

pub use coordinator_event::CoordinatorEvent;
pub use event_bus::EventBus;
