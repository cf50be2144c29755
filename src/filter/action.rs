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

//! Filter action module.
//!
//! This module contains the actions emitted by the rule engine and
//! their split into delivery and side-effect actions.

use log::{debug, trace};
use serde::Serialize;
use std::fmt;

use crate::FlagId;

/// Represents an action emitted by the rule engine.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub enum Action {
    /// Files the message into the default folder. An implicit keep
    /// means that no rule matched.
    Keep { implicit: bool },
    /// Files the message into the folder at the given path.
    FileInto(String),
    /// Sends the message to the given address.
    Redirect(String),
    /// Tags the message with the tag of the given name.
    Tag(String),
    /// Sets or clears the given mailbox flag.
    Flag { id: FlagId, set: bool },
    /// Represents an action of the rule engine this crate does not
    /// act upon, identified by its name.
    Other(String),
}

impl Action {
    pub fn keep() -> Self {
        Self::Keep { implicit: false }
    }

    pub fn implicit_keep() -> Self {
        Self::Keep { implicit: true }
    }

    pub fn file_into<P: ToString>(path: P) -> Self {
        Self::FileInto(path.to_string())
    }

    pub fn redirect<A: ToString>(addr: A) -> Self {
        Self::Redirect(addr.to_string())
    }

    pub fn tag<N: ToString>(name: N) -> Self {
        Self::Tag(name.to_string())
    }

    pub fn set_flag(id: FlagId) -> Self {
        Self::Flag { id, set: true }
    }

    pub fn clear_flag(id: FlagId) -> Self {
        Self::Flag { id, set: false }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Keep { implicit: true } => write!(f, "implicit keep"),
            Self::Keep { implicit: false } => write!(f, "keep"),
            Self::FileInto(path) => write!(f, "fileinto {:?}", path),
            Self::Redirect(addr) => write!(f, "redirect {:?}", addr),
            Self::Tag(name) => write!(f, "tag {:?}", name),
            Self::Flag { id, set: true } => write!(f, "flag {}", id),
            Self::Flag { id, set: false } => write!(f, "unflag {}", id),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Represents an action deciding where the message goes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub enum DeliveryAction {
    Keep { implicit: bool },
    FileInto(String),
    Redirect(String),
}

/// Represents an action marking the message wherever it goes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub enum SideEffectAction {
    Tag(String),
    Flag { id: FlagId, set: bool },
}

/// Represents the actions of a delivery split by kind, each list
/// keeping the order of the original action list.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct ClassifiedActions {
    pub delivery: Vec<DeliveryAction>,
    pub side_effects: Vec<SideEffectAction>,
}

/// Splits the given actions into delivery and side-effect actions.
/// Actions of other kinds are left out of both lists.
pub fn classify(actions: &[Action]) -> ClassifiedActions {
    debug!("classifying {} action(s)", actions.len());

    let mut classified = ClassifiedActions::default();

    for action in actions {
        match action {
            Action::Keep { implicit } => classified.delivery.push(DeliveryAction::Keep {
                implicit: *implicit,
            }),
            Action::FileInto(path) => classified
                .delivery
                .push(DeliveryAction::FileInto(path.to_owned())),
            Action::Redirect(addr) => classified
                .delivery
                .push(DeliveryAction::Redirect(addr.to_owned())),
            Action::Tag(name) => classified
                .side_effects
                .push(SideEffectAction::Tag(name.to_owned())),
            Action::Flag { id, set } => classified.side_effects.push(SideEffectAction::Flag {
                id: *id,
                set: *set,
            }),
            Action::Other(name) => trace!("skipping action {}", name),
        }
    }

    trace!("classified actions: {:?}", classified);
    classified
}

#[cfg(test)]
mod tests {
    use crate::{FLAG_FLAGGED, FLAG_UNREAD};

    use super::*;

    #[test]
    fn classify_keeps_relative_order() {
        let actions = vec![
            Action::tag("work"),
            Action::file_into("/Work"),
            Action::Other(String::from("vacation")),
            Action::clear_flag(FLAG_UNREAD),
            Action::redirect("carol@localhost"),
            Action::set_flag(FLAG_FLAGGED),
            Action::keep(),
            Action::tag("urgent"),
        ];

        assert_eq!(
            ClassifiedActions {
                delivery: vec![
                    DeliveryAction::FileInto(String::from("/Work")),
                    DeliveryAction::Redirect(String::from("carol@localhost")),
                    DeliveryAction::Keep { implicit: false },
                ],
                side_effects: vec![
                    SideEffectAction::Tag(String::from("work")),
                    SideEffectAction::Flag {
                        id: FLAG_UNREAD,
                        set: false
                    },
                    SideEffectAction::Flag {
                        id: FLAG_FLAGGED,
                        set: true
                    },
                    SideEffectAction::Tag(String::from("urgent")),
                ],
            },
            classify(&actions)
        );
    }

    #[test]
    fn classify_empty_and_unknown() {
        assert_eq!(ClassifiedActions::default(), classify(&[]));
        assert_eq!(
            ClassifiedActions::default(),
            classify(&[Action::Other(String::from("notify"))])
        );
    }

    #[test]
    fn classify_side_effects_only() {
        let classified = classify(&[Action::tag("work"), Action::set_flag(FLAG_FLAGGED)]);
        assert!(classified.delivery.is_empty());
        assert_eq!(2, classified.side_effects.len());
    }

    #[test]
    fn display_actions() {
        assert_eq!("implicit keep", Action::implicit_keep().to_string());
        assert_eq!("fileinto \"/Work\"", Action::file_into("/Work").to_string());
        assert_eq!("unflag -10", Action::clear_flag(FLAG_UNREAD).to_string());
    }
}
