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

//! Mail adapter module.
//!
//! This module contains the adapter the rule engine evaluates its
//! rules against, and which then applies the resulting actions to the
//! mailbox of the recipient.

use log::{debug, info, trace, warn};
use regex::Error as RegexError;
use serde::Serialize;
use std::result;
use thiserror::Error;

use crate::{
    backend::{self, remote, MailboxStore, RemoteConnector, SharedDeliveryContext, StoredMessage},
    classify, is_address_header, normalize_idn_header, prepare_redirect, resolve_marks,
    sender::{self, parse_recipient, Sender},
    Action, DeliveryAction, EmailError, Flags, FolderId, Marks, Mountpoint, ParsedMessage,
    SideEffectAction, SpamDetector, ID_FOLDER_INBOX, ID_FOLDER_SPAM, ID_FOLDER_USER_ROOT,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot compile spam header value pattern {1}")]
    CompileSpamPatternError(#[source] RegexError, String),

    #[error(transparent)]
    BackendError(#[from] backend::Error),
    #[error(transparent)]
    EmailError(#[from] EmailError),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the states a delivery goes through.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum DeliveryState {
    Start,
    Classified,
    /// The rule engine emitted no action, nothing was stored.
    Discarded,
    /// Only tag and flag actions were emitted, the message was filed
    /// into its default folder.
    DefaultFiled,
    ActionsApplied,
    Done,
}

/// Represents the adapter between the rule engine and the mailbox of
/// one recipient, for the delivery of one message.
pub struct MailAdapter<'a> {
    mbox: &'a dyn MailboxStore,
    msg: &'a ParsedMessage,
    rcpt: String,
    shared_ctx: Option<&'a SharedDeliveryContext>,
    spam: bool,
    remote: Option<&'a dyn RemoteConnector>,
    sender: Option<Box<dyn Sender + 'a>>,
    actions: Vec<Action>,
    state: DeliveryState,
    duplicate: bool,
    marks: Option<Marks>,
    messages: Vec<StoredMessage>,
}

impl<'a> MailAdapter<'a> {
    /// Creates the adapter. The spam verdict is read from the message
    /// headers right away and holds for the whole delivery.
    pub fn new<R: ToString>(
        mbox: &'a dyn MailboxStore,
        msg: &'a ParsedMessage,
        rcpt: R,
        shared_ctx: Option<&'a SharedDeliveryContext>,
        spam_detector: &SpamDetector,
    ) -> Self {
        let rcpt = rcpt.to_string();
        let spam = spam_detector.is_spam(msg);
        debug!("delivering message to {} (spam: {})", rcpt, spam);

        Self {
            mbox,
            msg,
            rcpt,
            shared_ctx,
            spam,
            remote: None,
            sender: None,
            actions: Vec::new(),
            state: DeliveryState::Start,
            duplicate: false,
            marks: None,
            messages: Vec::new(),
        }
    }

    /// Sets the connector used to file messages into mountpoints.
    /// Without it, messages filed into mountpoints land in the Inbox.
    pub fn remote_connector(mut self, remote: &'a dyn RemoteConnector) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Sets the sender used by redirect actions. Without it,
    /// redirected messages land in the Inbox.
    pub fn sender<S: Sender + 'a>(mut self, sender: S) -> Self {
        self.sender = Some(Box::new(sender));
        self
    }

    pub fn is_spam(&self) -> bool {
        self.spam
    }

    pub fn parsed_message(&self) -> &ParsedMessage {
        self.msg
    }

    pub fn recipient(&self) -> &str {
        &self.rcpt
    }

    pub fn mailbox(&self) -> &dyn MailboxStore {
        self.mbox
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    /// Tells whether the delivery stopped on a message already filed
    /// for the same shared delivery context.
    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    /// Returns the values of the given header. Address headers also
    /// expose the display form of their internationalized domains.
    pub fn header(&self, name: &str) -> Vec<String> {
        let vals = self.msg.headers(name);

        if !vals.is_empty() && is_address_header(name) {
            normalize_idn_header(name, &vals)
        } else {
            vals
        }
    }

    pub fn header_names(&self) -> Vec<String> {
        self.msg.header_names()
    }

    /// Returns the trimmed values of every header named after the
    /// given name, whatever its case.
    pub fn matching_headers(&self, name: &str) -> Vec<String> {
        self.header_names()
            .iter()
            .filter(|header| header.eq_ignore_ascii_case(name))
            .flat_map(|header| self.header(header))
            .map(|val| val.trim().to_owned())
            .collect()
    }

    pub fn size(&self) -> usize {
        self.msg.raw_size()
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn set_actions(&mut self, actions: Vec<Action>) {
        self.actions = actions;
    }

    /// Returns the copies of the message stored so far.
    pub fn processed_messages(&self) -> &[StoredMessage] {
        &self.messages
    }

    /// Applies the actions to the mailbox and returns the stored
    /// copies of the message.
    pub fn execute_actions(&mut self) -> Result<&[StoredMessage]> {
        debug!("executing {} action(s) for {}", self.actions.len(), self.rcpt);
        trace!("actions: {:?}", self.actions);

        // marks follow the current action list
        self.marks = None;
        self.duplicate = false;

        // an explicit discard leaves the rule engine without action
        if self.actions.is_empty() {
            info!(
                "discarding message with Message-ID {} from {}",
                self.msg.message_id().unwrap_or_default(),
                self.msg.sender()
            );
            self.transition(DeliveryState::Discarded);
            self.transition(DeliveryState::Done);
            return Ok(self.messages.as_slice());
        }

        let classified = classify(&self.actions);
        self.transition(DeliveryState::Classified);
        let side_effects = classified.side_effects.as_slice();

        if classified.delivery.is_empty() {
            if self.default_filing(side_effects)?.is_none() {
                self.duplicate = true;
            }
            self.transition(DeliveryState::DefaultFiled);
        } else {
            self.transition(DeliveryState::ActionsApplied);
        }

        for action in &classified.delivery {
            let stored = match action {
                DeliveryAction::Keep { implicit: true } => self.default_filing(side_effects)?,
                DeliveryAction::Keep { implicit: false } => {
                    self.add_message(ID_FOLDER_INBOX, side_effects)?
                }
                DeliveryAction::FileInto(path) => match self.file_into(path, side_effects)? {
                    Filing::Local(stored) => stored,
                    Filing::Remote => continue,
                },
                DeliveryAction::Redirect(addr) => {
                    self.redirect(addr, side_effects)?;
                    continue;
                }
            };

            if stored.is_none() {
                self.duplicate = true;
                break;
            }
        }

        if self.duplicate {
            debug!("filter actions ignored for duplicate message");
        }

        self.transition(DeliveryState::Done);
        Ok(self.messages.as_slice())
    }

    fn transition(&mut self, state: DeliveryState) {
        trace!("delivery state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn marks(&mut self, side_effects: &[SideEffectAction]) -> &Marks {
        let mbox = self.mbox;
        let rcpt = &self.rcpt;
        self.marks
            .get_or_insert_with(|| resolve_marks(side_effects, mbox, rcpt))
    }

    fn add_message(
        &mut self,
        folder_id: FolderId,
        side_effects: &[SideEffectAction],
    ) -> Result<Option<StoredMessage>> {
        let marks = self.marks(side_effects).clone();
        let stored = self.mbox.add_message(
            folder_id,
            self.msg,
            marks.flags,
            &marks.tags,
            &self.rcpt,
            self.shared_ctx,
        )?;

        if let Some(ref stored) = stored {
            trace!("stored message: {:?}", stored);
            self.messages.push(stored.clone());
        }

        Ok(stored)
    }

    /// Files the message into the Spam folder when it is spam, into
    /// the Inbox otherwise.
    fn default_filing(&mut self, side_effects: &[SideEffectAction]) -> Result<Option<StoredMessage>> {
        let folder_id = if self.spam {
            ID_FOLDER_SPAM
        } else {
            ID_FOLDER_INBOX
        };
        self.add_message(folder_id, side_effects)
    }

    fn file_into(&mut self, path: &str, side_effects: &[SideEffectAction]) -> Result<Filing> {
        let res = self
            .mbox
            .get_folder_by_path_longest_match(ID_FOLDER_USER_ROOT, path)?;
        debug!(
            "attempting to file to {}, remaining path: {:?}",
            res.folder,
            res.remaining_path()
        );

        let folder_id = match res.folder.mountpoint() {
            Some(mountpoint) => {
                match self.file_into_mountpoint(mountpoint, res.remaining_path(), side_effects) {
                    Ok(true) => return Ok(Filing::Remote),
                    Ok(false) => ID_FOLDER_INBOX,
                    Err(err) => {
                        warn!("cannot file to {}, filing to Inbox instead: {}", path, err);
                        ID_FOLDER_INBOX
                    }
                }
            }
            None if res.is_partial() => {
                warn!("cannot find folder {}, filing to Inbox instead", path);
                ID_FOLDER_INBOX
            }
            None if res.folder.id == ID_FOLDER_USER_ROOT => {
                warn!("cannot file to the mailbox root {:?}, filing to Inbox instead", path);
                ID_FOLDER_INBOX
            }
            None => res.folder.id,
        };

        Ok(Filing::Local(self.add_message(folder_id, side_effects)?))
    }

    /// Files the message into the remote folder the mountpoint points
    /// to. Returns `false` when the remote folder cannot be found.
    fn file_into_mountpoint(
        &mut self,
        mountpoint: &Mountpoint,
        remaining_path: Option<&str>,
        side_effects: &[SideEffectAction],
    ) -> remote::Result<bool> {
        let connector = self
            .remote
            .ok_or_else(|| remote::Error::ConnectorMissingError(mountpoint.owner_id.clone()))?;
        let token = self.mbox.auth_token()?;
        let mut session = connector.connect(&token, &mountpoint.owner_id)?;

        let id = mountpoint.remote_item_id();
        let folder = match session.get_folder_by_id(&id)? {
            Some(folder) => folder,
            None => {
                warn!(
                    "cannot find remote folder {} of mountpoint, filing to Inbox instead",
                    id
                );
                return Ok(false);
            }
        };

        let folder = match remaining_path {
            None => folder,
            Some(path) => match session.get_subfolder_by_path(&folder, path)? {
                Some(folder) => folder,
                None => {
                    warn!(
                        "subfolder {} of mountpoint {} does not exist, filing to Inbox instead",
                        path, id
                    );
                    return Ok(false);
                }
            },
        };

        let flags = Flags::from_bitmask(self.marks(side_effects).flags);
        session.add_message(&folder, &flags, self.msg.raw())?;
        debug!("message filed to remote folder {} of {}", folder.path, id);

        Ok(true)
    }

    /// Sends the message to the given address. A message that cannot
    /// be sent is filed into the Inbox.
    fn redirect(&mut self, addr: &str, side_effects: &[SideEffectAction]) -> Result<()> {
        info!("redirecting message to {}", addr);

        if let Err(err) = self.send_redirect(addr) {
            warn!("redirect to {} failed, saving message to Inbox: {}", addr, err);
            // a duplicate here does not stop the delivery
            self.add_message(ID_FOLDER_INBOX, side_effects)?;
        }

        Ok(())
    }

    fn send_redirect(&mut self, addr: &str) -> sender::Result<()> {
        let rcpt = parse_recipient(addr)?;
        let sender = self
            .sender
            .as_deref_mut()
            .ok_or_else(|| sender::Error::SenderMissingError(rcpt.clone()))?;
        let email = prepare_redirect(self.msg);
        sender.send(&email, &rcpt)
    }
}

/// Represents where a file into action put the message.
enum Filing {
    /// Filed into a local folder, `None` for a duplicate.
    Local(Option<StoredMessage>),
    Remote,
}
