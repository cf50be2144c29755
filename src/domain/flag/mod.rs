//! Flag module.
//!
//! This module contains everything related to message flags, both
//! the transport flags understood by remote stores and the mailbox
//! flag namespace the filter actions refer to.

pub mod flag;
pub use flag::*;

pub mod flags;
pub use flags::*;

pub mod mailbox_flag;
pub use mailbox_flag::*;
