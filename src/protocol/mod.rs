// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for communicating with Prana devices.
//!
//! [`HttpClient`] sends raw requests and classifies transport failures;
//! [`CommandResponse`] wraps the body, which may legitimately be empty for
//! write endpoints.

mod http;

pub use http::{HttpClient, HttpConfig};

use crate::error::ParseError;

/// Response body from a device request.
#[derive(Debug, Clone)]
pub struct CommandResponse {
    body: String,
}

impl CommandResponse {
    /// Creates a new response with the given body.
    #[must_use]
    pub fn new(body: String) -> Self {
        Self { body }
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns `true` if the device sent no body.
    ///
    /// Write endpoints often answer a successful request this way.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::EmptyBody` for an empty body, or
    /// `ParseError::Json` if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, ParseError> {
        if self.is_empty() {
            return Err(ParseError::EmptyBody);
        }
        serde_json::from_str(&self.body).map_err(Into::into)
    }
}
