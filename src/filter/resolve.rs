//! Mark resolution module.
//!
//! This module turns tag and flag actions into the flag bitmask and
//! the tag list stored alongside every copy of the message.

use log::{debug, trace, warn};
use serde::Serialize;

use crate::{backend::MailboxStore, SideEffectAction, Tags, BITMASK_UNREAD};

/// Represents the marks applied to every copy of the message.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Marks {
    pub flags: u32,
    pub tags: Tags,
}

impl Default for Marks {
    fn default() -> Self {
        Self {
            flags: BITMASK_UNREAD,
            tags: Tags::default(),
        }
    }
}

/// Computes the flag bitmask of the given actions. The bitmask starts
/// unread, then each flag action sets or clears its bit in order.
/// Flags the mailbox does not know are skipped.
pub fn resolve_flags(actions: &[SideEffectAction], mbox: &dyn MailboxStore) -> u32 {
    let mut bitmask = BITMASK_UNREAD;

    for action in actions {
        if let SideEffectAction::Flag { id, set } = action {
            match mbox.get_flag_by_id(*id) {
                Ok(flag) if *set => bitmask |= flag.bitmask,
                Ok(flag) => bitmask &= !flag.bitmask,
                Err(err) => warn!("cannot flag message with flag {}, skipping it: {}", id, err),
            }
        }
    }

    debug!("resolved flag bitmask: {:#x}", bitmask);
    bitmask
}

/// Resolves the tag names of the given actions into tag ids, in
/// order. Tags the mailbox does not know are skipped.
pub fn resolve_tags(actions: &[SideEffectAction], mbox: &dyn MailboxStore, rcpt: &str) -> Tags {
    let mut tags = Tags::default();

    for action in actions {
        if let SideEffectAction::Tag(name) = action {
            match mbox.get_tag_by_name(name) {
                Ok(tag) => tags.push(tag.id),
                Err(err) if err.is_not_found() => {
                    warn!("tag {} does not exist, cannot tag message for {}", name, rcpt)
                }
                Err(err) => warn!("cannot resolve tag {}: {}", name, err),
            }
        }
    }

    debug!("resolved tags: {}", tags);
    tags
}

pub fn resolve_marks(actions: &[SideEffectAction], mbox: &dyn MailboxStore, rcpt: &str) -> Marks {
    let marks = Marks {
        flags: resolve_flags(actions, mbox),
        tags: resolve_tags(actions, mbox, rcpt),
    };
    trace!("resolved marks: {:?}", marks);
    marks
}
