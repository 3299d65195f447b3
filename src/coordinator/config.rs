// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration types for the coordinator.

use std::time::Duration;

/// Configuration for a [`Coordinator`](super::Coordinator).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use prana_lib::coordinator::{CoordinatorConfig, PowerOrdering, RetryPolicy};
///
/// let config = CoordinatorConfig::new("Living room")
///     .with_poll_interval(Duration::from_secs(30))
///     .with_settle_delay(Duration::from_millis(800))
///     .with_retry(RetryPolicy::new().with_max_attempts(5))
///     .with_power_ordering(PowerOrdering::PowerThenSpeed);
///
/// assert_eq!(config.retry.max_attempts, 5);
/// ```
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Friendly name, used in log output.
    pub name: String,
    /// Interval between background polls.
    pub poll_interval: Duration,
    /// Pause after a write before the state is re-read.
    pub settle_delay: Duration,
    /// Retry policy for the write step of a command.
    pub retry: RetryPolicy,
    /// Maximum snapshot age for which an unchanged command is skipped.
    ///
    /// `None` disables the shortcut; every command then reaches the device.
    pub skip_max_age: Option<Duration>,
    /// Write order for [`request_fan_level`](super::Coordinator::request_fan_level).
    pub power_ordering: PowerOrdering,
    /// Capacity of the event channel.
    pub event_capacity: usize,
}

impl CoordinatorConfig {
    /// Default interval between background polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
    /// Default pause between a write and the following read.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
    /// Default maximum snapshot age for skipping unchanged commands.
    pub const DEFAULT_SKIP_MAX_AGE: Duration = Duration::from_secs(60);
    /// Default event channel capacity.
    pub const DEFAULT_EVENT_CAPACITY: usize = 64;

    /// Creates a configuration with default timings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the polling interval.
    ///
    /// A zero interval is raised to one millisecond.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Sets the settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Skips commands already reflected by a snapshot younger than `max_age`.
    #[must_use]
    pub fn with_skip_max_age(mut self, max_age: Duration) -> Self {
        self.skip_max_age = Some(max_age);
        self
    }

    /// Sends every command to the device, even when the cache already
    /// matches.
    #[must_use]
    pub fn without_skip(mut self) -> Self {
        self.skip_max_age = None;
        self
    }

    /// Sets the write order used when a fan level change also powers the
    /// fan on.
    #[must_use]
    pub fn with_power_ordering(mut self, ordering: PowerOrdering) -> Self {
        self.power_ordering = ordering;
        self
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            name: "Prana Recuperator".to_string(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            retry: RetryPolicy::default(),
            skip_max_age: Some(Self::DEFAULT_SKIP_MAX_AGE),
            power_ordering: PowerOrdering::default(),
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Order of the two writes when a fan is set to a non-zero level while off.
///
/// Firmware versions may apply these differently; the default matches what
/// is known to work on current devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PowerOrdering {
    /// Write the speed, then turn the fan on.
    #[default]
    SpeedThenPower,
    /// Turn the fan on, then write the speed.
    PowerThenSpeed,
}

/// Retry policy for command writes.
///
/// Only transient failures are retried; invalid arguments fail on the first
/// attempt.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use prana_lib::coordinator::RetryPolicy;
///
/// // Default: 3 attempts, 1 s apart
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(1));
///
/// // Bounded exponential backoff
/// let policy = RetryPolicy::new()
///     .with_max_attempts(5)
///     .with_delay(Duration::from_millis(200))
///     .with_backoff_multiplier(2.0)
///     .with_max_delay(Duration::from_secs(1));
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
/// assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. At least 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub delay: Duration,
    /// Multiplier applied to the delay after each further failure.
    pub backoff_multiplier: f32,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sets the total number of attempts (minimum 1).
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the delay after the first failure.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f32) -> Self {
        self.backoff_multiplier = multiplier.max(1.0);
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let multiplier = self.backoff_multiplier.powi(exponent);

        // Safe: delays are milliseconds to seconds, far from f32 limits
        #[allow(clippy::cast_precision_loss)]
        let delay_ms = self.delay.as_millis() as f32 * multiplier;

        // Safe: delay_ms is non-negative; the min() below bounds it
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = Duration::from_millis(delay_ms as u64);

        delay.min(self.max_delay)
    }

    /// Returns `true` if another attempt follows failed attempt `attempt`.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            backoff_multiplier: 1.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.skip_max_age, Some(Duration::from_secs(60)));
        assert_eq!(config.power_ordering, PowerOrdering::SpeedThenPower);
    }

    #[test]
    fn config_builder_chain() {
        let config = CoordinatorConfig::new("Bedroom")
            .with_poll_interval(Duration::ZERO)
            .with_settle_delay(Duration::from_millis(10))
            .without_skip()
            .with_event_capacity(0);

        assert_eq!(config.name, "Bedroom");
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert_eq!(config.settle_delay, Duration::from_millis(10));
        assert!(config.skip_max_age.is_none());
        assert_eq!(config.event_capacity, 1);
    }

    #[test]
    fn fixed_delay_by_default() {
        let policy = RetryPolicy::default();
        for attempt in 1..=5 {
            assert_eq!(policy.delay_for_attempt(attempt), Duration::from_secs(1));
        }
    }

    #[test]
    fn backoff_is_bounded() {
        let policy = RetryPolicy::new()
            .with_delay(Duration::from_millis(100))
            .with_backoff_multiplier(3.0)
            .with_max_delay(Duration::from_millis(500));

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(300));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_millis(500));
    }

    #[test]
    fn should_retry_respects_max_attempts() {
        let policy = RetryPolicy::new().with_max_attempts(3);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));

        let policy = RetryPolicy::no_retry();
        assert!(!policy.should_retry(1));
    }

    #[test]
    fn max_attempts_is_at_least_one() {
        assert_eq!(RetryPolicy::new().with_max_attempts(0).max_attempts, 1);
    }
}
