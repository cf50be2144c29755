//! Memory backend module.
//!
//! This module contains an in-memory mailbox store. It holds a folder
//! tree with mountpoints, the tag and flag namespaces and the filed
//! messages, and suppresses duplicates per shared delivery context,
//! recipient and folder.

use log::{debug, trace};
use std::{
    collections::{BTreeMap, HashSet},
    result,
    sync::{Mutex, MutexGuard},
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    backend::{self, AuthToken, MailboxStore, SharedDeliveryContext, StoredMessage},
    join_path, split_path, FlagId, Folder, FolderId, FolderKind, FolderResolution, MailboxFlag,
    Mountpoint, ParsedMessage, Tag, TagId, Tags, ID_FOLDER_DRAFTS, ID_FOLDER_INBOX, ID_FOLDER_ROOT,
    ID_FOLDER_SENT, ID_FOLDER_SPAM, ID_FOLDER_TRASH, SYSTEM_FLAGS,
};

/// Represents the first id given to user folders.
pub const FIRST_USER_FOLDER_ID: FolderId = 256;

/// Represents the first id given to tags.
pub const FIRST_TAG_ID: TagId = 64;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot lock memory mailbox: {0}")]
    LockMailboxError(String),
    #[error("cannot create folder {0}: parent folder does not exist")]
    FindParentFolderError(String),
    #[error("cannot create folder {0}: folder already exists")]
    FolderAlreadyExistsError(String),
    #[error("cannot create folder at the mailbox root")]
    CreateRootFolderError,
    #[error("cannot create tag {0}: tag already exists")]
    TagAlreadyExistsError(String),
}

pub type Result<T> = result::Result<T, Error>;

type DeliveryKey = (Uuid, String, FolderId);

#[derive(Debug, Default)]
struct State {
    folders: BTreeMap<FolderId, Folder>,
    next_folder_id: FolderId,
    tags: Vec<Tag>,
    flags: Vec<MailboxFlag>,
    messages: Vec<(StoredMessage, Vec<u8>)>,
    delivered: HashSet<DeliveryKey>,
}

impl State {
    fn find_folder_by_path(&self, path: &str) -> Option<&Folder> {
        self.folders
            .values()
            .find(|folder| folder.path.eq_ignore_ascii_case(path))
    }
}

/// Represents the in-memory mailbox.
#[derive(Debug)]
pub struct MemoryMailbox {
    account_id: String,
    auth_token: Option<AuthToken>,
    state: Mutex<State>,
}

impl MemoryMailbox {
    /// Creates a mailbox holding the system folders and flags.
    pub fn new<A: ToString>(account_id: A) -> Self {
        let mut state = State {
            next_folder_id: FIRST_USER_FOLDER_ID,
            flags: SYSTEM_FLAGS.iter().map(MailboxFlag::from).collect(),
            ..State::default()
        };

        for (id, name) in [
            (ID_FOLDER_ROOT, ""),
            (ID_FOLDER_INBOX, "Inbox"),
            (ID_FOLDER_TRASH, "Trash"),
            (ID_FOLDER_SPAM, "Junk"),
            (ID_FOLDER_SENT, "Sent"),
            (ID_FOLDER_DRAFTS, "Drafts"),
        ] {
            let segments = if name.is_empty() { vec![] } else { vec![name] };
            state.folders.insert(
                id,
                Folder {
                    id,
                    name: name.into(),
                    path: join_path(&segments),
                    kind: FolderKind::Local,
                },
            );
        }

        Self {
            account_id: account_id.to_string(),
            auth_token: None,
            state: Mutex::new(state),
        }
    }

    pub fn with_auth_token<T: ToString>(mut self, token: T) -> Self {
        self.auth_token = Some(AuthToken::new(token));
        self
    }

    fn state(&self) -> Result<MutexGuard<State>> {
        self.state
            .lock()
            .map_err(|err| Error::LockMailboxError(err.to_string()))
    }

    fn create_folder_with_kind(&self, path: &str, kind: FolderKind) -> Result<Folder> {
        let mut state = self.state()?;
        let segments = split_path(path);
        let (name, parent_segments) = segments
            .split_last()
            .ok_or(Error::CreateRootFolderError)?;

        let path = join_path(&segments);
        if state.find_folder_by_path(&path).is_some() {
            return Err(Error::FolderAlreadyExistsError(path));
        }

        match state.find_folder_by_path(&join_path(parent_segments)) {
            Some(parent) if !parent.is_mountpoint() => (),
            _ => return Err(Error::FindParentFolderError(path)),
        }

        let folder = Folder {
            id: state.next_folder_id,
            name: name.to_string(),
            path,
            kind,
        };
        debug!("creating folder {} with id {}", folder, folder.id);

        state.next_folder_id += 1;
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    /// Creates a local folder. The parent folder must exist.
    pub fn create_folder(&self, path: &str) -> Result<Folder> {
        self.create_folder_with_kind(path, FolderKind::Local)
    }

    /// Creates a mountpoint to the folder `remote_id` of the account
    /// `owner_id`.
    pub fn create_mountpoint<O: ToString>(
        &self,
        path: &str,
        owner_id: O,
        remote_id: FolderId,
    ) -> Result<Folder> {
        let mountpoint = Mountpoint {
            owner_id: owner_id.to_string(),
            remote_id,
        };
        self.create_folder_with_kind(path, FolderKind::Mountpoint(mountpoint))
    }

    pub fn create_tag<N: ToString>(&self, name: N) -> Result<Tag> {
        let mut state = self.state()?;
        let name = name.to_string();

        if state.tags.iter().any(|tag| tag.name.eq_ignore_ascii_case(&name)) {
            return Err(Error::TagAlreadyExistsError(name));
        }

        let tag = Tag {
            id: FIRST_TAG_ID + state.tags.len() as TagId,
            name,
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    /// Returns the messages filed so far, in filing order.
    pub fn messages(&self) -> Result<Vec<StoredMessage>> {
        Ok(self
            .state()?
            .messages
            .iter()
            .map(|(msg, _)| msg.clone())
            .collect())
    }

    pub fn messages_in(&self, folder_id: FolderId) -> Result<Vec<StoredMessage>> {
        Ok(self
            .messages()?
            .into_iter()
            .filter(|msg| msg.folder_id == folder_id)
            .collect())
    }

    /// Returns the raw content of a filed message.
    pub fn raw_message(&self, id: u32) -> Result<Option<Vec<u8>>> {
        Ok(self
            .state()?
            .messages
            .iter()
            .find(|(msg, _)| msg.id == id)
            .map(|(_, raw)| raw.clone()))
    }
}

impl MailboxStore for MemoryMailbox {
    fn account_id(&self) -> String {
        self.account_id.clone()
    }

    fn auth_token(&self) -> backend::Result<AuthToken> {
        self.auth_token
            .clone()
            .ok_or_else(|| backend::Error::GetAuthTokenError(self.account_id.clone()))
    }

    fn add_message(
        &self,
        folder_id: FolderId,
        msg: &ParsedMessage,
        flags: u32,
        tags: &Tags,
        rcpt: &str,
        shared_ctx: Option<&SharedDeliveryContext>,
    ) -> backend::Result<Option<StoredMessage>> {
        debug!("adding message to folder {} for {}", folder_id, rcpt);

        let mut state = self.state()?;

        match state.folders.get(&folder_id) {
            None => return Err(backend::Error::FindFolderError(folder_id)),
            Some(folder) if folder.is_mountpoint() => {
                return Err(backend::Error::AddMessageError(
                    String::from("folder is a mountpoint"),
                    folder_id,
                ))
            }
            Some(_) => (),
        }

        if let Some(ctx) = shared_ctx {
            let key = (*ctx.id(), rcpt.to_lowercase(), folder_id);
            if !state.delivered.insert(key) {
                debug!(
                    "message already filed in folder {} for {}, skipping duplicate",
                    folder_id, rcpt
                );
                return Ok(None);
            }
        }

        let stored = StoredMessage {
            id: state.messages.len() as u32 + 1,
            folder_id,
            flags,
            tags: tags.clone(),
        };
        trace!("stored message: {:?}", stored);

        state.messages.push((stored.clone(), msg.raw().to_vec()));
        Ok(Some(stored))
    }

    fn get_folder_by_path_longest_match(
        &self,
        root_id: FolderId,
        path: &str,
    ) -> backend::Result<FolderResolution> {
        let state = self.state()?;
        let root = state
            .folders
            .get(&root_id)
            .ok_or(backend::Error::FindFolderError(root_id))?;

        let mut segments = split_path(&root.path);
        let root_len = segments.len();
        segments.extend(split_path(path));

        for len in (root_len..=segments.len()).rev() {
            if let Some(folder) = state.find_folder_by_path(&join_path(&segments[..len])) {
                let remaining_path = segments[len..].join("/");
                trace!("folder {} matches path {}", folder, path);
                return Ok(FolderResolution::partial(folder.clone(), remaining_path));
            }
        }

        Ok(FolderResolution::partial(root.clone(), path))
    }

    fn get_folder_by_id(&self, id: FolderId) -> backend::Result<Folder> {
        self.state()?
            .folders
            .get(&id)
            .cloned()
            .ok_or(backend::Error::FindFolderError(id))
    }

    fn get_tag_by_name(&self, name: &str) -> backend::Result<Tag> {
        self.state()?
            .tags
            .iter()
            .find(|tag| tag.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| backend::Error::FindTagError(name.to_owned()))
    }

    fn get_flag_by_id(&self, id: FlagId) -> backend::Result<MailboxFlag> {
        self.state()?
            .flags
            .iter()
            .find(|flag| flag.id == id)
            .cloned()
            .ok_or(backend::Error::FindFlagError(id))
    }
}
