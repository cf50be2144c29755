//! Sender module.
//!
//! This module contains the sender interface used to hand redirected
//! messages over to the mail transport.

use mailparse::{MailAddr, MailParseError};
use std::result;
use thiserror::Error;

use crate::sender::sendmail;

#[cfg(feature = "smtp-sender")]
use crate::sender::smtp;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot send message to {0}: sender is not defined")]
    SenderMissingError(String),
    #[error("cannot parse recipient {1}")]
    ParseRecipientError(#[source] MailParseError, String),
    #[error("cannot find a single recipient in {0}")]
    FindRecipientError(String),

    #[error(transparent)]
    SendmailError(#[from] sendmail::Error),
    #[cfg(feature = "smtp-sender")]
    #[error(transparent)]
    SmtpError(#[from] smtp::Error),
}

pub type Result<T> = result::Result<T, Error>;

pub trait Sender {
    /// Sends the raw message to the given recipient only, whatever
    /// the recipients listed in its headers.
    fn send(&mut self, email: &[u8], rcpt: &str) -> Result<()>;
}

/// Parses the address of a single recipient, as found in redirect
/// actions.
pub fn parse_recipient(addr: &str) -> Result<String> {
    let addrs =
        mailparse::addrparse(addr).map_err(|err| Error::ParseRecipientError(err, addr.to_owned()))?;

    match addrs.first() {
        Some(MailAddr::Single(info)) if addrs.len() == 1 && info.addr.contains('@') => {
            Ok(info.addr.to_owned())
        }
        _ => Err(Error::FindRecipientError(addr.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_recipient, Error};

    #[test]
    fn parse_single_recipient() {
        assert_eq!("carol@localhost", parse_recipient("carol@localhost").unwrap());
        assert_eq!(
            "carol@localhost",
            parse_recipient("\"Carol\" <carol@localhost>").unwrap()
        );
    }

    #[test]
    fn parse_invalid_recipients() {
        assert!(matches!(
            parse_recipient("carol@localhost, dave@localhost"),
            Err(Error::FindRecipientError(_))
        ));
        assert!(matches!(
            parse_recipient("carol"),
            Err(Error::ParseRecipientError(_, _))
        ));
        assert!(matches!(
            parse_recipient("undisclosed-recipients:;"),
            Err(Error::FindRecipientError(_))
        ));
        assert!(parse_recipient("").is_err());
    }
}
