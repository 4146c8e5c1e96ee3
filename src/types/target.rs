// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Charger and connector addressing.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Connector number on a charger.
///
/// The realtime protocol sends the connector as a string; configuration may
/// provide it either as an integer or as a numeric string.
///
/// # Examples
///
/// ```
/// use wevo_lib::types::Connector;
///
/// assert_eq!(Connector::default().value(), 1);
/// assert_eq!(Connector::new(2).to_string(), "2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Connector(u32);

impl Connector {
    /// The connector used when none is configured.
    pub const DEFAULT: Self = Self(1);

    /// Creates a connector number.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw connector number.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Connector {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Connector {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for Connector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self(value)),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| serde::de::Error::custom(format!("invalid connector: {text}"))),
        }
    }
}

/// The charger/connector pair one session controls.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChargerTarget {
    charger_identifier: String,
    connector: Connector,
}

impl ChargerTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(charger_identifier: impl Into<String>, connector: Connector) -> Self {
        Self {
            charger_identifier: charger_identifier.into(),
            connector,
        }
    }

    /// Returns the charger identifier.
    #[must_use]
    pub fn charger_identifier(&self) -> &str {
        &self.charger_identifier
    }

    /// Returns the connector.
    #[must_use]
    pub fn connector(&self) -> Connector {
        self.connector
    }
}

impl fmt::Display for ChargerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.charger_identifier, self.connector)
    }
}
