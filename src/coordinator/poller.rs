// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background polling task.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::device::DeviceApi;

use super::Coordinator;

/// Handle to a running background poller.
///
/// Dropping the handle also stops the poller, after any poll in progress.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stops the poller and waits for it to exit.
    ///
    /// A poll already in progress is allowed to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Poller task ended abnormally");
        }
    }

    /// Returns `true` once the poller task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<D: DeviceApi + 'static> Coordinator<D> {
    /// Starts polling the device in the background.
    ///
    /// The first poll runs immediately, then one every
    /// [`poll_interval`](super::CoordinatorConfig::poll_interval). A poll
    /// that overruns the interval delays the next one instead of bunching
    /// them up. Must be called from within a Tokio runtime.
    #[must_use = "dropping the handle stops the poller"]
    pub fn spawn_poller(self: &Arc<Self>) -> PollerHandle {
        let coordinator = Arc::clone(self);
        let period = self.config().poll_interval;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let name = coordinator.config().name.clone();
            tracing::info!(device = %name, interval = ?period, "Poller started");

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Err means the handle was dropped
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        coordinator.poll().await;
                    }
                }
            }

            tracing::info!(device = %name, "Poller stopped");
        });

        PollerHandle { shutdown_tx, task }
    }
}
