// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State coordination for a Prana device.
//!
//! A [`Coordinator`] sits between consumers and one [`Device`](crate::Device).
//! It owns the cached snapshot, polls it periodically, and runs every command
//! as a single-flight cycle:
//!
//! 1. take the device lock
//! 2. skip the command if a recent snapshot already reflects it
//! 3. read the current state (diagnostics only)
//! 4. write, retrying transient failures per [`RetryPolicy`]
//! 5. wait [`CoordinatorConfig::settle_delay`]
//! 6. re-read and publish the new snapshot
//!
//! Background polls take the same lock, so a poll never observes the device
//! between a write and its follow-up read.

mod config;
mod device_coordinator;
mod poller;

pub use config::{CoordinatorConfig, PowerOrdering, RetryPolicy};
pub use device_coordinator::{CommandOutcome, Coordinator, CoordinatorState};
pub use poller::PollerHandle;
