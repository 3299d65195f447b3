// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `prana_lib` library.
//!
//! Every failure is ultimately classified into one of three [`ErrorKind`]s:
//!
//! - [`ErrorKind::InvalidArgument`]: a local precondition failed before any
//!   request was sent. Never retried.
//! - [`ErrorKind::Connection`]: the device could not be reached or timed out.
//! - [`ErrorKind::Protocol`]: the device answered, but with an unexpected
//!   status or a body that could not be parsed.

use std::fmt;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A value failed validation before reaching the device.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// HTTP communication with the device failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The device response could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Classifies this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Value(_) => ErrorKind::InvalidArgument,
            Self::Protocol(err) => err.kind(),
            Self::Parse(_) => ErrorKind::Protocol,
        }
    }

    /// Returns `true` if the failed operation may succeed when repeated.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Coarse classification of an [`Error`].
///
/// This is what the coordinator records as its last error, so it is small,
/// `Copy` and comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller precondition violated; surfaced before any device contact.
    InvalidArgument,
    /// Device unreachable or timed out.
    Connection,
    /// Device reachable but returned an unexpected status or malformed body.
    Protocol,
}

impl ErrorKind {
    /// Returns `true` for transient failures.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Connection | Self::Protocol)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidArgument => "invalid argument",
            Self::Connection => "connection error",
            Self::Protocol => "protocol error",
        };
        f.write_str(s)
    }
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A raw speed is not one of 0, 10, ..., 60.
    #[error("invalid speed {0}: must be a multiple of 10 between 0 and 60")]
    InvalidSpeed(u16),

    /// A raw brightness is not one of 0, 1, 2, 4, 8, 16, 32.
    #[error("invalid brightness {0}: must be one of 0, 1, 2, 4, 8, 16, 32")]
    InvalidBrightness(u16),

    /// An unknown subsystem (fan type) name.
    #[error("unknown subsystem: {0}")]
    UnknownSubsystem(String),

    /// An unknown mode (switch type) name.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// An unknown sensor name.
    #[error("unknown sensor: {0}")]
    UnknownSensor(String),
}

/// Errors related to HTTP communication with the device.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed for a reason other than connect or timeout.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The device answered with a non-success status.
    #[error("HTTP {status} - {reason}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The canonical reason phrase.
        reason: String,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl ProtocolError {
    /// Classifies this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout(_) => ErrorKind::Connection,
            Self::Http(err) if err.is_connect() || err.is_timeout() => ErrorKind::Connection,
            Self::InvalidAddress(_) => ErrorKind::InvalidArgument,
            Self::Http(_) | Self::Status { .. } => ErrorKind::Protocol,
        }
    }
}

/// Errors related to parsing device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was empty where a body was required.
    #[error("empty response body")]
    EmptyBody,

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
