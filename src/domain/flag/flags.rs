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
use std::{collections::HashSet, fmt, ops};

use crate::{Flag, BITMASK_UNREAD, FLAG_UNREAD, SYSTEM_FLAGS};

/// Represents the list of transport flags attached to a message
/// filed outside of the local mailbox.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Flags(pub HashSet<Flag>);

impl Flags {
    /// Builds transport flags out of a mailbox flag bitmask. The
    /// absence of the unread bit is what makes a message seen.
    pub fn from_bitmask(bitmask: u32) -> Self {
        let mut flags = Flags::default();

        if bitmask & BITMASK_UNREAD == 0 {
            flags.insert(Flag::Seen);
        }

        for flag in SYSTEM_FLAGS.iter() {
            if flag.id != FLAG_UNREAD && bitmask & flag.bitmask() != 0 {
                flags.insert(Flag::from_mailbox_flag(flag.id, flag.name));
            }
        }

        flags
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut glue = "";

        for flag in &self.0 {
            write!(f, "{}{}", glue, flag)?;
            glue = " ";
        }

        Ok(())
    }
}

impl ops::Deref for Flags {
    type Target = HashSet<Flag>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Flags {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<T: IntoIterator<Item = Flag>>(iter: T) -> Self {
        let mut flags = Flags::default();
        flags.extend(iter);
        flags
    }
}
