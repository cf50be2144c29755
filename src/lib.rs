pub(crate) mod process;

pub mod backend;
pub use backend::*;

pub mod config;
pub use config::*;

pub mod domain;
pub use domain::*;

pub mod filter;
pub use filter::*;
pub use filter::{Error, Result};

pub mod sender;
pub use sender::*;
