//! Tag module.
//!
//! This module contains the representation of mailbox tags.

pub mod tag;
pub use tag::*;
