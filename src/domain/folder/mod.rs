//! Folder module.
//!
//! This module contains everything related to mailbox folders.

pub mod folder;
pub use folder::*;

pub mod resolution;
pub use resolution::*;
