//! Config module.
//!
//! This module contains the process-wide configuration of the
//! delivery pipeline, built once at startup.

pub mod filter;
pub use filter::*;
