// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request/response client for a Prana device.
//!
//! [`Device`] maps logical operations onto the device's HTTP endpoints and
//! responses onto typed results. It holds no state, never retries and never
//! caches; that is the job of the [`Coordinator`](crate::Coordinator).
//!
//! ```no_run
//! use prana_lib::Device;
//! use prana_lib::types::{Mode, Speed, Subsystem};
//!
//! # async fn example() -> prana_lib::Result<()> {
//! let device = Device::http("192.168.1.40")?;
//!
//! let state = device.read_state().await?;
//! println!("supply at {}%", state.percentage(Subsystem::Supply));
//!
//! device.set_speed(Speed::new(30)?, Subsystem::Supply).await?;
//! device.set_mode(Mode::Night, true).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use crate::command::Command;
use crate::error::Result;
use crate::protocol::{HttpClient, HttpConfig};
use crate::state::DeviceSnapshot;
use crate::types::{Brightness, Mode, Speed, Subsystem};

/// Endpoint returning the full device state.
const STATE_ENDPOINT: &str = "getState";

/// The two primitive operations the coordinator needs from a device.
///
/// [`Device`] implements this over HTTP; tests implement it with in-memory
/// fakes.
pub trait DeviceApi: Send + Sync {
    /// Reads the full device state.
    ///
    /// # Errors
    ///
    /// Returns a connection or protocol error if the read fails.
    fn read_state(&self) -> impl Future<Output = Result<DeviceSnapshot>> + Send;

    /// Sends one state-changing command.
    ///
    /// # Errors
    ///
    /// Returns a connection or protocol error if the write fails.
    fn send(&self, command: &Command) -> impl Future<Output = Result<()>> + Send;
}

/// HTTP client for one Prana device.
#[derive(Debug, Clone)]
pub struct Device {
    client: HttpClient,
}

impl Device {
    /// Creates a device client for `host` with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn http(host: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpConfig::new(host))
    }

    /// Creates a device client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty or the HTTP client cannot be
    /// created.
    pub fn with_config(config: HttpConfig) -> Result<Self> {
        Ok(Self {
            client: config.into_client()?,
        })
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Reads the state payload and returns it unparsed.
    ///
    /// Useful to check that a host is a reachable Prana device before
    /// setting up a coordinator for it.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not JSON.
    pub async fn probe(&self) -> Result<serde_json::Value> {
        let response = self.client.get(STATE_ENDPOINT).await?;
        Ok(response.json()?)
    }

    /// Reads and parses the full device state.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    pub async fn read_state(&self) -> Result<DeviceSnapshot> {
        let raw = self.probe().await?;
        Ok(DeviceSnapshot::from_json(raw)?)
    }

    /// Sets the native speed of one subsystem.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn set_speed(&self, speed: Speed, subsystem: Subsystem) -> Result<()> {
        self.send(&Command::SetSpeed { speed, subsystem }).await
    }

    /// Turns one subsystem's fan on or off.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn set_on(&self, on: bool, subsystem: Subsystem) -> Result<()> {
        self.send(&Command::SetOn { on, subsystem }).await
    }

    /// Enables or disables a mode.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn set_mode(&self, mode: Mode, on: bool) -> Result<()> {
        self.send(&Command::SetMode { mode, on }).await
    }

    /// Sets the display brightness.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn set_brightness(&self, brightness: Brightness) -> Result<()> {
        self.send(&Command::SetBrightness(brightness)).await
    }

    /// Sends a command.
    ///
    /// Any success status means the device accepted the command. The body
    /// may be empty, JSON or plain text; it is only logged.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the status is not a success.
    pub async fn send(&self, command: &Command) -> Result<()> {
        let response = self.client.post(command.endpoint(), &command.body()).await?;

        if response.is_empty() {
            tracing::debug!(%command, "Command accepted with empty response");
            return Ok(());
        }

        match response.json() {
            Ok(body) => tracing::debug!(%command, response = %body, "Command accepted"),
            Err(e) => tracing::debug!(
                %command,
                response = response.body(),
                error = %e,
                "Command accepted with non-JSON response"
            ),
        }
        Ok(())
    }
}

impl DeviceApi for Device {
    async fn read_state(&self) -> Result<DeviceSnapshot> {
        Device::read_state(self).await
    }

    async fn send(&self, command: &Command) -> Result<()> {
        Device::send(self, command).await
    }
}
