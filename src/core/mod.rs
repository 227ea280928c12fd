//! FLARM Relay - Core constants and error types.
//!
//! This module has no I/O and no async runtime dependency. It is always
//! compiled, independent of feature flags.

mod constants;
mod error;

pub use constants::*;
pub use error::*;
