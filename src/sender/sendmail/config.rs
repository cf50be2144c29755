//! Sendmail config module.
//!
//! This module contains the representation of the sendmail email
//! sender configuration.

use serde::{Deserialize, Serialize};

/// Represents the sendmail sender config.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SendmailConfig {
    /// Represents the sendmail command. The message is piped into it
    /// and the recipient is given as last argument.
    pub cmd: String,
}

impl Default for SendmailConfig {
    fn default() -> Self {
        Self {
            cmd: String::from("/usr/sbin/sendmail -i --"),
        }
    }
}
