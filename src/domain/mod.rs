//! Domain module.
//!
//! This module contains the mailbox entities the delivery core works
//! with: messages, flags, folders and tags.

pub mod email;
pub use email::*;

pub mod flag;
pub use flag::*;

pub mod folder;
pub use folder::*;

pub mod tag;
pub use tag::*;
