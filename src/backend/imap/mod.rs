pub mod config;
pub use config::ImapConfig;

mod imap_flags;
pub use imap_flags::*;

mod session;
pub use session::{Error, ImapConnector, ImapSession, ImapSessionStream, Result};
