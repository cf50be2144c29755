//! Filter module.
//!
//! This module contains the delivery core: the split of the rule
//! engine actions, the resolution of tags and flags, the spam verdict
//! and the adapter applying the actions to a mailbox.

mod action;
pub use action::*;

mod resolve;
pub use resolve::*;

mod spam;
pub use spam::*;

mod adapter;
pub use adapter::{DeliveryState, Error, MailAdapter, Result};
