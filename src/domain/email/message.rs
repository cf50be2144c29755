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

//! Parsed message module.
//!
//! This module contains the immutable view over the raw message
//! bytes used during one delivery.

use log::trace;
use mailparse::{MailAddr, MailParseError};
use std::result;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("cannot parse email headers")]
    ParseHeadersError(#[source] MailParseError),
}

pub type Result<T> = result::Result<T, EmailError>;

/// Represents a message parsed once at delivery start. Header values
/// are kept in their original order and already RFC 2047 decoded.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ParsedMessage {
    raw: Vec<u8>,
    headers: Vec<(String, String)>,
}

impl ParsedMessage {
    pub fn from_bytes<B: Into<Vec<u8>>>(raw: B) -> Result<Self> {
        let raw = raw.into();
        let (headers, _) = mailparse::parse_headers(&raw).map_err(EmailError::ParseHeadersError)?;
        let headers = headers
            .iter()
            .map(|header| (header.get_key(), header.get_value()))
            .collect::<Vec<_>>();
        trace!("parsed headers: {:?}", headers);

        Ok(Self { raw, headers })
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn raw_size(&self) -> usize {
        self.raw.len()
    }

    /// Returns the values of every occurrence of the given header,
    /// matching the name case-insensitively.
    pub fn headers(&self, name: &str) -> Vec<String> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, val)| val.to_owned())
            .collect()
    }

    /// Returns the value of the first occurrence of the given header.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, val)| val.to_owned())
    }

    /// Returns the header names present in the message, each name
    /// listed once with the spelling of its first occurrence.
    pub fn header_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        for (key, _) in &self.headers {
            if !names.iter().any(|name| name.eq_ignore_ascii_case(key)) {
                names.push(key.to_owned());
            }
        }

        names
    }

    pub fn message_id(&self) -> Option<String> {
        self.header("Message-ID")
    }

    /// Returns the address of the message author, taken from the
    /// `From` header then from the `Sender` header.
    pub fn sender(&self) -> String {
        ["From", "Sender"]
            .iter()
            .filter_map(|name| self.header(name))
            .find_map(|val| first_addr(&val).or_else(|| Some(val.trim().to_owned())))
            .unwrap_or_default()
    }
}

fn first_addr(val: &str) -> Option<String> {
    mailparse::addrparse(val)
        .ok()?
        .iter()
        .find_map(|addr| match addr {
            MailAddr::Single(info) => Some(info.addr.to_owned()),
            MailAddr::Group(group) => group.addrs.first().map(|info| info.addr.to_owned()),
        })
}
