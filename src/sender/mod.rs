pub mod sender;
pub use sender::{parse_recipient, Error, Result, Sender};

pub mod sendmail;
pub use sendmail::{Sendmail, SendmailConfig};

#[cfg(feature = "smtp-sender")]
pub mod smtp;
#[cfg(feature = "smtp-sender")]
pub use smtp::{Smtp, SmtpConfig};
