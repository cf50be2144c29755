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

use serde::Serialize;
use std::fmt;

use crate::{FlagId, FLAG_DELETED, FLAG_DRAFT, FLAG_FLAGGED, FLAG_REPLIED};

/// Represents the flag variants.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize)]
pub enum Flag {
    Seen,
    Answered,
    Flagged,
    Deleted,
    Draft,
    Custom(String),
}

impl Flag {
    pub fn custom<F: ToString>(flag: F) -> Self {
        Self::Custom(flag.to_string())
    }

    /// Maps a mailbox system flag onto its transport counterpart.
    /// Flags without a standard counterpart become custom flags
    /// named after the mailbox flag.
    pub fn from_mailbox_flag(id: FlagId, name: &str) -> Self {
        match id {
            FLAG_REPLIED => Flag::Answered,
            FLAG_FLAGGED => Flag::Flagged,
            FLAG_DELETED => Flag::Deleted,
            FLAG_DRAFT => Flag::Draft,
            _ => Flag::custom(name),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Flag::Seen => write!(f, "seen"),
            Flag::Answered => write!(f, "answered"),
            Flag::Flagged => write!(f, "flagged"),
            Flag::Deleted => write!(f, "deleted"),
            Flag::Draft => write!(f, "draft"),
            Flag::Custom(flag) => write!(f, "{}", flag),
        }
    }
}
