// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-flight state coordinator for one device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

use crate::command::Command;
use crate::device::{Device, DeviceApi};
use crate::error::{ErrorKind, Result};
use crate::event::{CoordinatorEvent, EventBus};
use crate::state::DeviceSnapshot;
use crate::types::{BrightnessLevel, Mode, SpeedLevel, Subsystem};

use super::config::{CoordinatorConfig, PowerOrdering};

/// Observable lifecycle of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No read has succeeded yet.
    Uninitialized,
    /// A snapshot is available and no command is running.
    Ready,
    /// A command cycle is running.
    CommandInFlight,
}

/// Result of a command that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was written and the state refreshed.
    Applied,
    /// The cached state already matched; nothing was sent.
    Skipped,
}

impl CommandOutcome {
    /// Returns `true` if the device was contacted.
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Owns the cached state of one device and serializes all access to it.
///
/// Background polls and consumer commands take the same lock, so at most one
/// read-modify-write sequence talks to the device at a time. Waiting commands
/// are served in arrival order.
///
/// The latest snapshot is readable at any time without the lock, through
/// [`current_snapshot`](Self::current_snapshot) or [`watch`](Self::watch).
/// A failed read never clears it: consumers keep the last good state and
/// [`last_error`](Self::last_error) tells them it is stale.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use prana_lib::types::{Mode, Subsystem};
/// use prana_lib::{Coordinator, CoordinatorConfig, Device};
///
/// # async fn example() -> prana_lib::Result<()> {
/// let device = Device::http("192.168.1.40")?;
/// let coordinator = Arc::new(Coordinator::new(device, CoordinatorConfig::new("Hall")));
///
/// // Fail setup early if the device is unreachable
/// coordinator.first_refresh().await?;
/// let poller = coordinator.spawn_poller();
///
/// coordinator.request_speed(3, Subsystem::Supply).await?;
/// coordinator.request_switch(Mode::Night, true).await?;
///
/// poller.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Coordinator<D = Device> {
    device: D,
    config: CoordinatorConfig,
    io_lock: tokio::sync::Mutex<()>,
    snapshot_tx: watch::Sender<Option<Arc<DeviceSnapshot>>>,
    last_error: Mutex<Option<ErrorKind>>,
    command_in_flight: AtomicBool,
    events: EventBus,
}

impl<D: DeviceApi> Coordinator<D> {
    /// Creates a coordinator for `device`.
    ///
    /// No request is made until the first refresh or poll.
    #[must_use]
    pub fn new(device: D, config: CoordinatorConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let events = EventBus::with_capacity(config.event_capacity);

        Self {
            device,
            config,
            io_lock: tokio::sync::Mutex::new(()),
            snapshot_tx,
            last_error: Mutex::new(None),
            command_in_flight: AtomicBool::new(false),
            events,
        }
    }

    /// Returns the underlying device client.
    #[must_use]
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Returns the most recent successfully read snapshot.
    #[must_use]
    pub fn current_snapshot(&self) -> Option<Arc<DeviceSnapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    /// Returns the kind of the last refresh failure, cleared by the next
    /// successful read.
    #[must_use]
    pub fn last_error(&self) -> Option<ErrorKind> {
        *self.last_error.lock()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        if self.command_in_flight.load(Ordering::Acquire) {
            CoordinatorState::CommandInFlight
        } else if self.snapshot_tx.borrow().is_none() {
            CoordinatorState::Uninitialized
        } else {
            CoordinatorState::Ready
        }
    }

    /// Returns a receiver that observes every published snapshot.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Option<Arc<DeviceSnapshot>>> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribes to coordinator events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    /// Performs the initial read during setup.
    ///
    /// Unlike [`poll`](Self::poll), the failure is returned so that setup
    /// can be aborted for an unreachable device.
    ///
    /// # Errors
    ///
    /// Returns the connection or protocol error of the read.
    pub async fn first_refresh(&self) -> Result<Arc<DeviceSnapshot>> {
        let snapshot = self.force_refresh().await?;
        tracing::info!(device = %self.config.name, "Initial state loaded");
        Ok(snapshot)
    }

    /// Reads the device state now and publishes it.
    ///
    /// The failure is recorded in [`last_error`](Self::last_error) as for a
    /// poll, and also returned.
    ///
    /// # Errors
    ///
    /// Returns the connection or protocol error of the read.
    pub async fn force_refresh(&self) -> Result<Arc<DeviceSnapshot>> {
        let _guard = self.io_lock.lock().await;
        self.refresh_locked().await
    }

    /// Runs one poll cycle.
    ///
    /// Failures never propagate: they are recorded in
    /// [`last_error`](Self::last_error), published as
    /// [`CoordinatorEvent::UpdateFailed`] and the previous snapshot is kept.
    /// Returns `true` if the read succeeded.
    pub async fn poll(&self) -> bool {
        let _guard = self.io_lock.lock().await;
        self.refresh_locked().await.is_ok()
    }

    /// Sets the speed level (0..=6) of one subsystem.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a level above 6, before contacting the
    /// device. Otherwise returns the final write error after retries.
    pub async fn request_speed(&self, level: u8, subsystem: Subsystem) -> Result<CommandOutcome> {
        let speed = SpeedLevel::new(level)?.to_speed();
        self.execute(Command::SetSpeed { speed, subsystem }).await
    }

    /// Turns one subsystem's fan on or off.
    ///
    /// # Errors
    ///
    /// Returns the final write error after retries.
    pub async fn request_on(&self, on: bool, subsystem: Subsystem) -> Result<CommandOutcome> {
        self.execute(Command::SetOn { on, subsystem }).await
    }

    /// Enables or disables a mode.
    ///
    /// # Errors
    ///
    /// Returns the final write error after retries.
    pub async fn request_switch(&self, mode: Mode, on: bool) -> Result<CommandOutcome> {
        self.execute(Command::SetMode { mode, on }).await
    }

    /// Sets the display brightness level (0..=6).
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a level above 6, before contacting the
    /// device. Otherwise returns the final write error after retries.
    pub async fn request_brightness(&self, level: u8) -> Result<CommandOutcome> {
        let brightness = BrightnessLevel::new(level)?.to_brightness();
        self.execute(Command::SetBrightness(brightness)).await
    }

    /// Moves a fan to `level` (0..=6), powering it on or off as needed.
    ///
    /// Level 0 turns the fan off. A non-zero level sets the speed and, unless
    /// a recent snapshot shows the fan already on, turns it on; the write
    /// order follows [`CoordinatorConfig::power_ordering`]. Both writes run
    /// under a single lock acquisition. Without a snapshot younger than
    /// [`CoordinatorConfig::skip_max_age`] every write is sent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a level above 6. Otherwise returns the
    /// first write error; the remaining write is not attempted.
    pub async fn request_fan_level(
        &self,
        level: u8,
        subsystem: Subsystem,
    ) -> Result<CommandOutcome> {
        let level = SpeedLevel::new(level)?;

        let _guard = self.io_lock.lock().await;
        let _in_flight = InFlight::enter(&self.command_in_flight);

        if level.is_off() {
            return self
                .run_command(Command::SetOn {
                    on: false,
                    subsystem,
                })
                .await;
        }

        let speed = Command::SetSpeed {
            speed: level.to_speed(),
            subsystem,
        };
        let was_on = self
            .fresh_snapshot()
            .is_some_and(|s| s.is_on(subsystem));
        if was_on {
            return self.run_command(speed).await;
        }

        let power = Command::SetOn { on: true, subsystem };
        let (first, second) = match self.config.power_ordering {
            PowerOrdering::SpeedThenPower => (speed, power),
            PowerOrdering::PowerThenSpeed => (power, speed),
        };

        let first = self.run_command(first).await?;
        let second = self.run_command(second).await?;

        if first.is_applied() || second.is_applied() {
            Ok(CommandOutcome::Applied)
        } else {
            Ok(CommandOutcome::Skipped)
        }
    }

    /// Runs a full command cycle for `command`.
    ///
    /// The cycle takes the lock, skips the command if a recent snapshot
    /// already reflects it, reads the current state for diagnostics, writes
    /// under the retry policy, waits the settle delay and refreshes the
    /// snapshot. The refresh happens even when the write fails.
    ///
    /// # Errors
    ///
    /// Returns the error of the last write attempt.
    pub async fn execute(&self, command: Command) -> Result<CommandOutcome> {
        let _guard = self.io_lock.lock().await;
        let _in_flight = InFlight::enter(&self.command_in_flight);
        self.run_command(command).await
    }

    // Caller holds io_lock.
    async fn run_command(&self, command: Command) -> Result<CommandOutcome> {
        if self.is_already_applied(&command) {
            return Ok(self.skip(command));
        }

        match self.device.read_state().await {
            Ok(current) => tracing::debug!(
                device = %self.config.name,
                %command,
                current = %command.current_value(&current),
                "Executing command"
            ),
            Err(e) => tracing::warn!(
                device = %self.config.name,
                %command,
                error = %e,
                "Pre-command read failed, sending command anyway"
            ),
        }

        let result = self.write_with_retry(&command).await;

        tokio::time::sleep(self.config.settle_delay).await;

        // A failed refresh is recorded in last_error and published
        let _ = self.refresh_locked().await;

        match result {
            Ok(()) => {
                tracing::debug!(device = %self.config.name, %command, "Command applied");
                self.events
                    .publish_with(|| CoordinatorEvent::CommandCompleted { command });
                Ok(CommandOutcome::Applied)
            }
            Err(err) => {
                tracing::error!(
                    device = %self.config.name,
                    %command,
                    error = %err,
                    "Command failed"
                );
                self.events.publish_with(|| CoordinatorEvent::CommandFailed {
                    command,
                    kind: err.kind(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn is_already_applied(&self, command: &Command) -> bool {
        self.fresh_snapshot()
            .is_some_and(|s| command.is_satisfied_by(&s))
    }

    /// The cached snapshot, if skipping is enabled and it is recent enough
    /// to decide on.
    fn fresh_snapshot(&self) -> Option<Arc<DeviceSnapshot>> {
        let max_age = self.config.skip_max_age?;
        self.current_snapshot().filter(|s| s.age() <= max_age)
    }

    fn skip(&self, command: Command) -> CommandOutcome {
        tracing::debug!(
            device = %self.config.name,
            %command,
            "State already matches, skipping command"
        );
        self.events
            .publish_with(|| CoordinatorEvent::CommandSkipped { command });
        CommandOutcome::Skipped
    }

    async fn write_with_retry(&self, command: &Command) -> Result<()> {
        let policy = &self.config.retry;
        let mut attempt = 1;

        loop {
            match self.device.send(command).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_retryable() && policy.should_retry(attempt) => {
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::warn!(
                        device = %self.config.name,
                        %command,
                        attempt,
                        max_attempts = policy.max_attempts,
                        ?delay,
                        error = %err,
                        "Command attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    // Caller holds io_lock.
    async fn refresh_locked(&self) -> Result<Arc<DeviceSnapshot>> {
        match self.device.read_state().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.last_error.lock() = None;
                self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
                tracing::debug!(device = %self.config.name, "State refreshed");
                self.events.publish_with(|| CoordinatorEvent::Updated {
                    snapshot: Arc::clone(&snapshot),
                });
                Ok(snapshot)
            }
            Err(err) => {
                let kind = err.kind();
                *self.last_error.lock() = Some(kind);
                tracing::warn!(
                    device = %self.config.name,
                    %kind,
                    error = %err,
                    has_previous = self.snapshot_tx.borrow().is_some(),
                    "State refresh failed, keeping previous snapshot"
                );
                self.events.publish_with(|| CoordinatorEvent::UpdateFailed {
                    kind,
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }
}

/// Marks a command cycle as running for as long as it lives.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
