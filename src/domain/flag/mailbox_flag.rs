//! Mailbox flag module.
//!
//! Mailbox flags are identified by a negative id. Each id owns one bit
//! of the flag bitmask stored alongside a message: flag `-n` maps to
//! bit `n - 1`.

use serde::Serialize;
use std::fmt;

/// Represents the identifier of a mailbox flag.
pub type FlagId = i8;

pub const FLAG_FROM_ME: FlagId = -1;
pub const FLAG_ATTACHED: FlagId = -2;
pub const FLAG_REPLIED: FlagId = -3;
pub const FLAG_FORWARDED: FlagId = -4;
pub const FLAG_COPIED: FlagId = -5;
pub const FLAG_FLAGGED: FlagId = -6;
pub const FLAG_DRAFT: FlagId = -7;
pub const FLAG_DELETED: FlagId = -8;
pub const FLAG_NOTIFIED: FlagId = -9;
pub const FLAG_UNREAD: FlagId = -10;
pub const FLAG_HIGH_PRIORITY: FlagId = -11;
pub const FLAG_LOW_PRIORITY: FlagId = -12;

pub const BITMASK_UNREAD: u32 = bitmask_of(FLAG_UNREAD);

/// Returns the bit owned by the given flag id, or `0` when the id is
/// outside of the 32 available bits.
pub const fn bitmask_of(id: FlagId) -> u32 {
    let bit = -(id as i32) - 1;
    if bit < 0 || bit > 31 {
        0
    } else {
        1 << bit
    }
}

/// Represents an entry of the built-in flag table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SystemFlag {
    pub id: FlagId,
    pub name: &'static str,
}

impl SystemFlag {
    pub const fn bitmask(&self) -> u32 {
        bitmask_of(self.id)
    }
}

/// Built-in flags every mailbox exposes.
pub const SYSTEM_FLAGS: [SystemFlag; 12] = [
    SystemFlag { id: FLAG_FROM_ME, name: "sent" },
    SystemFlag { id: FLAG_ATTACHED, name: "attachment" },
    SystemFlag { id: FLAG_REPLIED, name: "replied" },
    SystemFlag { id: FLAG_FORWARDED, name: "forwarded" },
    SystemFlag { id: FLAG_COPIED, name: "copied" },
    SystemFlag { id: FLAG_FLAGGED, name: "flagged" },
    SystemFlag { id: FLAG_DRAFT, name: "draft" },
    SystemFlag { id: FLAG_DELETED, name: "deleted" },
    SystemFlag { id: FLAG_NOTIFIED, name: "notified" },
    SystemFlag { id: FLAG_UNREAD, name: "unread" },
    SystemFlag { id: FLAG_HIGH_PRIORITY, name: "priority" },
    SystemFlag { id: FLAG_LOW_PRIORITY, name: "low-priority" },
];

/// Represents a flag of the mailbox flag namespace, as returned by
/// the mailbox store.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MailboxFlag {
    pub id: FlagId,
    pub name: String,
    pub bitmask: u32,
}

impl MailboxFlag {
    pub fn new<N: ToString>(id: FlagId, name: N) -> Self {
        Self {
            id,
            name: name.to_string(),
            bitmask: bitmask_of(id),
        }
    }

    /// Looks up a flag of the built-in table.
    pub fn system(id: FlagId) -> Option<Self> {
        SYSTEM_FLAGS
            .iter()
            .find(|flag| flag.id == id)
            .map(|flag| Self::new(flag.id, flag.name))
    }
}

impl From<&SystemFlag> for MailboxFlag {
    fn from(flag: &SystemFlag) -> Self {
        Self::new(flag.id, flag.name)
    }
}

impl fmt::Display for MailboxFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
