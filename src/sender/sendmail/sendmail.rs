//! Sendmail module.
//!
//! This module contains the representation of the sendmail email
//! sender.

use log::debug;
use std::result;
use thiserror::Error;

use crate::{process, sender, Sender, SendmailConfig};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot run sendmail command")]
    RunCmdError(#[source] process::Error),
}

pub type Result<T> = result::Result<T, Error>;

pub struct Sendmail<'a> {
    config: &'a SendmailConfig,
}

impl<'a> Sendmail<'a> {
    pub fn new(config: &'a SendmailConfig) -> Self {
        Self { config }
    }
}

/// Quotes an argument for `sh`.
fn quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r#"'\''"#))
}

impl<'a> Sender for Sendmail<'a> {
    fn send(&mut self, email: &[u8], rcpt: &str) -> sender::Result<()> {
        let cmd = format!("{} {}", self.config.cmd, quote(rcpt));
        debug!("sending message to {} with sendmail", rcpt);
        process::run(&cmd, email).map_err(Error::RunCmdError)?;
        Ok(())
    }
}
