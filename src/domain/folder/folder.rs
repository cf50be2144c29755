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

//! Folder module.
//!
//! This module contains the representation of the mailbox folder,
//! including mountpoints that reference a folder of another mailbox.

use serde::Serialize;
use std::fmt;

/// Represents the identifier of a folder inside a mailbox.
pub type FolderId = u32;

pub const ID_FOLDER_ROOT: FolderId = 1;
pub const ID_FOLDER_USER_ROOT: FolderId = 1;
pub const ID_FOLDER_INBOX: FolderId = 2;
pub const ID_FOLDER_TRASH: FolderId = 3;
pub const ID_FOLDER_SPAM: FolderId = 4;
pub const ID_FOLDER_SENT: FolderId = 5;
pub const ID_FOLDER_DRAFTS: FolderId = 6;

/// Represents the folder hierarchy delimiter.
pub const FOLDER_DELIM: char = '/';

/// Represents a folder of a given account, used to address folders
/// living in another mailbox.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize)]
pub struct ItemId {
    pub account_id: String,
    pub id: FolderId,
}

impl ItemId {
    pub fn new<A: ToString>(account_id: A, id: FolderId) -> Self {
        Self {
            account_id: account_id.to_string(),
            id,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.account_id, self.id)
    }
}

/// Represents a local folder that points to a folder owned by another
/// account.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Mountpoint {
    /// Represents the account owning the shared folder.
    pub owner_id: String,
    /// Represents the id of the shared folder in the owner mailbox.
    pub remote_id: FolderId,
}

impl Mountpoint {
    pub fn remote_item_id(&self) -> ItemId {
        ItemId::new(&self.owner_id, self.remote_id)
    }
}

/// Represents the folder variants.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub enum FolderKind {
    Local,
    Mountpoint(Mountpoint),
}

impl Default for FolderKind {
    fn default() -> Self {
        Self::Local
    }
}

/// Represents the folder.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct Folder {
    /// Represents the folder id.
    pub id: FolderId,
    /// Represents the folder name.
    pub name: String,
    /// Represents the absolute folder path, starting with the
    /// hierarchy delimiter.
    pub path: String,
    pub kind: FolderKind,
}

impl Folder {
    pub fn mountpoint(&self) -> Option<&Mountpoint> {
        match &self.kind {
            FolderKind::Mountpoint(mountpoint) => Some(mountpoint),
            FolderKind::Local => None,
        }
    }

    pub fn is_mountpoint(&self) -> bool {
        self.mountpoint().is_some()
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Splits a folder path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(FOLDER_DELIM)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Joins folder path segments into an absolute path.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::new();

    for segment in segments {
        path.push(FOLDER_DELIM);
        path.push_str(segment.as_ref());
    }

    if path.is_empty() {
        path.push(FOLDER_DELIM);
    }

    path
}
