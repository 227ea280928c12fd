//! FLARM Relay - Forwarding Session
//!
//! A session is one end-to-end run of connect → relay → terminate for a
//! single [`RelayConfig`]. It runs on its own tokio task and is controlled
//! through a [`SessionHandle`]; a [`SessionHost`] enforces that at most one
//! session is active at a time.

mod config;
mod host;
#[allow(clippy::module_inception)]
mod session;
mod state;
mod stats;

pub use config::*;
pub use host::*;
pub use session::*;
pub use state::*;
pub use stats::*;
