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

//! IMAP connector config module.
//!
//! This module contains the representation of the IMAP server hosting
//! the mailboxes reached through mountpoints.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, result};
use thiserror::Error;

use crate::{process, AuthToken, ItemId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot get imap password")]
    GetPasswdError(#[source] process::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the IMAP connector configuration.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImapConfig {
    /// Represents the IMAP server host.
    pub host: String,
    /// Represents the IMAP server port.
    pub port: u16,
    /// Enables SSL.
    pub ssl: Option<bool>,
    /// Enables StartTLS.
    pub starttls: Option<bool>,
    /// Trusts any certificate.
    pub insecure: Option<bool>,
    /// Represents the login of the account allowed to act on behalf
    /// of mailbox owners.
    pub login: String,
    /// Represents the password command of that account. When absent,
    /// the mailbox auth token is used as password.
    pub passwd_cmd: Option<String>,
    /// Maps shared folders, written `account:id`, to the name of the
    /// matching IMAP mailbox in the owner account.
    #[serde(default)]
    pub mounts: HashMap<String, String>,
}

impl ImapConfig {
    /// Gets the SSL IMAP option.
    pub fn ssl(&self) -> bool {
        self.ssl.unwrap_or(true)
    }

    /// Gets the StartTLS IMAP option.
    pub fn starttls(&self) -> bool {
        self.starttls.unwrap_or_default()
    }

    /// Gets the insecure IMAP option.
    pub fn insecure(&self) -> bool {
        self.insecure.unwrap_or_default()
    }

    /// Executes the password command, falling back to the given auth
    /// token when no command is configured or when it prints nothing.
    pub fn passwd(&self, token: &AuthToken) -> Result<String> {
        let passwd = match self.passwd_cmd.as_deref() {
            Some(cmd) => process::run_first_line(cmd).map_err(Error::GetPasswdError)?,
            None => None,
        };
        Ok(passwd.unwrap_or_else(|| token.as_str().to_owned()))
    }

    /// Returns the IMAP mailbox mounted for the given shared folder.
    pub fn find_mount(&self, id: &ItemId) -> Option<&str> {
        self.mounts.get(&id.to_string()).map(String::as_str)
    }
}
