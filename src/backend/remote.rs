//! Remote mailbox module.
//!
//! This module exposes the traits used to file messages into folders
//! owned by another account, reached through a mountpoint.

use serde::Serialize;
use std::{fmt, result};
use thiserror::Error;

use crate::{backend, Flags, ItemId};

#[cfg(feature = "imap-backend")]
use crate::backend::imap;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot connect to mailbox of account {0}: remote delivery not configured")]
    ConnectorMissingError(String),
    #[error("cannot authenticate to mailbox of account {0}")]
    AuthenticateError(String),
    #[error("cannot add message to remote folder {0}")]
    AddMessageError(String),

    #[error(transparent)]
    BackendError(#[from] backend::Error),
    #[cfg(feature = "imap-backend")]
    #[error(transparent)]
    ImapError(#[from] imap::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the credential a mailbox uses to act against the
/// mailbox of another account.
#[derive(Clone, Eq, PartialEq)]
pub struct AuthToken(pub String);

impl AuthToken {
    pub fn new<T: ToString>(token: T) -> Self {
        Self(token.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// tokens are credentials, keep them out of logs
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AuthToken(***)")
    }
}

/// Represents a folder of a remote mailbox.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RemoteFolder {
    /// Represents the identifier the remote session uses to address
    /// the folder.
    pub id: String,
    /// Represents the folder path in the remote mailbox.
    pub path: String,
    /// Represents the folder hierarchy delimiter of the remote
    /// mailbox.
    pub delim: String,
}

/// Opens authenticated sessions to remote mailboxes.
pub trait RemoteConnector {
    /// Authenticates with the local mailbox token and opens a session
    /// to the mailbox of the given owner.
    fn connect(&self, token: &AuthToken, owner_id: &str) -> Result<Box<dyn RemoteSession + '_>>;
}

/// Represents an authenticated session to a remote mailbox.
pub trait RemoteSession {
    fn get_folder_by_id(&mut self, id: &ItemId) -> Result<Option<RemoteFolder>>;

    /// Looks up a folder below the given one. The path is relative to
    /// the parent folder and uses `/` as delimiter.
    fn get_subfolder_by_path(
        &mut self,
        parent: &RemoteFolder,
        path: &str,
    ) -> Result<Option<RemoteFolder>>;

    fn add_message(&mut self, folder: &RemoteFolder, flags: &Flags, email: &[u8]) -> Result<()>;
}
