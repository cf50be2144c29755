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

//! SMTP config module.
//!
//! This module contains the representation of the SMTP email sender
//! configuration.

use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use serde::{Deserialize, Serialize};
use std::result;
use thiserror::Error;

use crate::process;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot get smtp password")]
    GetPasswdError(#[source] process::Error),
    #[error("cannot get smtp password: password is empty")]
    GetPasswdEmptyError,
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the SMTP sender config.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SmtpConfig {
    /// Represents the SMTP server host.
    pub host: String,
    /// Represents the SMTP server port.
    pub port: u16,
    /// Enables SSL.
    pub ssl: Option<bool>,
    /// Enables StartTLS.
    pub starttls: Option<bool>,
    /// Trusts any certificate.
    pub insecure: Option<bool>,
    /// Represents the SMTP server login. Relays accepting mail
    /// without authentication need none.
    pub login: Option<String>,
    /// Represents the SMTP password command.
    pub passwd_cmd: Option<String>,
}

impl SmtpConfig {
    /// Builds the SMTP sender credentials, if a login is configured.
    pub fn credentials(&self) -> Result<Option<SmtpCredentials>> {
        let login = match self.login.as_deref() {
            Some(login) => login,
            None => return Ok(None),
        };

        let passwd = match self.passwd_cmd.as_deref() {
            Some(cmd) => process::run_first_line(cmd)
                .map_err(Error::GetPasswdError)?
                .ok_or(Error::GetPasswdEmptyError)?,
            None => return Err(Error::GetPasswdEmptyError),
        };

        Ok(Some(SmtpCredentials::new(login.to_owned(), passwd)))
    }

    pub fn ssl(&self) -> bool {
        self.ssl.unwrap_or(true)
    }

    pub fn starttls(&self) -> bool {
        self.starttls.unwrap_or_default()
    }

    pub fn insecure(&self) -> bool {
        self.insecure.unwrap_or_default()
    }
}
