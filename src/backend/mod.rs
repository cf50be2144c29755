mod backend;
pub mod memory;
pub mod remote;

#[cfg(feature = "imap-backend")]
pub mod imap;

pub use self::backend::{Error, MailboxStore, Result, SharedDeliveryContext, StoredMessage};
pub use self::memory::MemoryMailbox;
pub use self::remote::{AuthToken, RemoteConnector, RemoteFolder, RemoteSession};
#[cfg(feature = "imap-backend")]
pub use self::imap::{ImapConfig, ImapConnector, ImapSession};
