// sieve-delivery-lib, a Rust library for mail filter delivery.
// Copyright (C) 2022  soywod <clement.douin@posteo.net>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Filter config module.
//!
//! This module contains the representation of the filter
//! configuration shared by every delivery.

use serde::{Deserialize, Serialize};

/// Represents the spam marker set by the upstream spam detector.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpamConfig {
    /// Represents the name of the header added to spam messages.
    pub header: Option<String>,
    /// Represents the pattern the whole header value has to match for
    /// the message to be considered spam. When absent, the presence
    /// of the header is enough.
    pub header_value: Option<String>,
}

impl SpamConfig {
    pub fn header(&self) -> Option<&str> {
        self.header
            .as_deref()
            .map(str::trim)
            .filter(|header| !header.is_empty())
    }

    pub fn header_value(&self) -> Option<&str> {
        self.header_value.as_deref()
    }
}

/// Represents the filter configuration.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilterConfig {
    #[serde(default)]
    pub spam: SpamConfig,
}
