// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator event types.

use std::sync::Arc;

use crate::command::Command;
use crate::error::ErrorKind;
use crate::state::DeviceSnapshot;

/// Events emitted by a [`Coordinator`](crate::Coordinator).
///
/// Every successful read publishes [`Updated`](Self::Updated), whether it
/// came from the background poller, a forced refresh, or the refresh that
/// closes a command cycle.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// A new snapshot was published.
    Updated {
        /// The snapshot now returned by `current_snapshot()`.
        snapshot: Arc<DeviceSnapshot>,
    },

    /// A read failed; the previous snapshot is still served.
    UpdateFailed {
        /// Category of the failure.
        kind: ErrorKind,
        /// Human-readable failure message.
        message: String,
    },

    /// A command was written and the follow-up refresh ran.
    CommandCompleted {
        /// The command that was applied.
        command: Command,
    },

    /// A command could not be written.
    CommandFailed {
        /// The command that failed.
        command: Command,
        /// Category of the failure.
        kind: ErrorKind,
        /// Human-readable failure message.
        message: String,
    },

    /// A command was not sent because the cached state already matched.
    CommandSkipped {
        /// The command that was skipped.
        command: Command,
    },
}

impl CoordinatorEvent {
    /// Returns the command this event refers to, if any.
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        match self {
            Self::CommandCompleted { command }
            | Self::CommandFailed { command, .. }
            | Self::CommandSkipped { command } => Some(*command),
            Self::Updated { .. } | Self::UpdateFailed { .. } => None,
        }
    }

    /// Returns the error kind for failure events.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::UpdateFailed { kind, .. } | Self::CommandFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns `true` for failure events.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.error_kind().is_some()
    }
}
