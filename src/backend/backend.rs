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

//! Backend module.
//!
//! This module exposes the mailbox store trait the delivery core
//! files messages with. Custom stores implement it to plug their own
//! persistence in.

use serde::Serialize;
use std::result;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    backend::{memory, remote::AuthToken},
    Folder, FolderId, FolderResolution, FlagId, MailboxFlag, ParsedMessage, Tag, Tags,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find folder {0}")]
    FindFolderError(FolderId),
    #[error("cannot find tag {0}")]
    FindTagError(String),
    #[error("cannot find flag {0}")]
    FindFlagError(FlagId),
    #[error("cannot get auth token of account {0}")]
    GetAuthTokenError(String),
    #[error("cannot add message to folder {1}: {0}")]
    AddMessageError(String, FolderId),

    #[error(transparent)]
    MemoryError(#[from] memory::Error),
}

impl Error {
    /// Tells whether the error only means that the requested item
    /// does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FindFolderError(_) | Self::FindTagError(_) | Self::FindFlagError(_)
        )
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the token shared by the deliveries of one physical
/// message fanned out to several recipients. Stores use it to file a
/// message at most once per recipient and folder.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize)]
pub struct SharedDeliveryContext {
    id: Uuid,
}

impl SharedDeliveryContext {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }
}

impl Default for SharedDeliveryContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents one physical copy of a message in one folder.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct StoredMessage {
    pub id: u32,
    pub folder_id: FolderId,
    pub flags: u32,
    pub tags: Tags,
}

pub trait MailboxStore {
    /// Returns the id of the account owning the mailbox.
    fn account_id(&self) -> String;

    /// Returns the token used to act on behalf of the mailbox owner
    /// against other mailboxes.
    fn auth_token(&self) -> Result<AuthToken>;

    /// Files the message into the given folder. Returns `None` when
    /// the message was already filed there for the same recipient and
    /// shared delivery context.
    fn add_message(
        &self,
        folder_id: FolderId,
        msg: &ParsedMessage,
        flags: u32,
        tags: &Tags,
        rcpt: &str,
        shared_ctx: Option<&SharedDeliveryContext>,
    ) -> Result<Option<StoredMessage>>;

    /// Resolves the deepest existing folder of the given path,
    /// relative to the given root folder.
    fn get_folder_by_path_longest_match(
        &self,
        root_id: FolderId,
        path: &str,
    ) -> Result<FolderResolution>;

    fn get_folder_by_id(&self, id: FolderId) -> Result<Folder>;
    fn get_tag_by_name(&self, name: &str) -> Result<Tag>;
    fn get_flag_by_id(&self, id: FlagId) -> Result<MailboxFlag>;
}
