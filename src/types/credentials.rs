// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login credentials.

use std::fmt;

/// Account identifier and password for a password login.
///
/// Credentials are passed by value to the login call and dropped afterwards;
/// nothing in the library keeps them once tokens are issued.
///
/// # Examples
///
/// ```
/// use wevo_lib::types::Credentials;
///
/// let creds = Credentials::new("  driver@example.com ", "hunter2");
/// assert_eq!(creds.username(), "driver@example.com");
/// assert!(!format!("{creds:?}").contains("hunter2"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials, trimming surrounding whitespace from the username.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Returns the login identifier as supplied (usually an e-mail address).
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
