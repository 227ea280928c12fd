//! # FLARM Relay
//!
//! Forwards FLARM traffic sentences from a TCP stream to a UDP destination.
//!
//! A traffic source (typically an app exposing the FLARM data port) emits
//! newline-terminated NMEA-style sentences over TCP. A consumer, such as a
//! flight instrument app, only listens for datagrams. FLARM Relay bridges
//! the two and can drop `PFLAA` traffic reports whose relative vertical
//! distance lies outside a configured band:
//!
//! - **Byte-exact**: accepted lines are forwarded unmodified, one datagram
//!   per line, in arrival order
//! - **Filtered**: with the filter on, only traffic within `±limit` meters
//!   passes; lines without a readable distance are dropped
//! - **Cancellable**: a session stops promptly on request and always
//!   releases both sockets
//! - **Single-shot**: one connection attempt per session, no reconnect
//!
//! ## Feature Flags
//!
//! - `transport` (default): TCP line reader and UDP datagram sender
//! - `session` (default): forwarding session, host boundary, statistics
//!
//! ## Modules
//!
//! - [`core`]: Constants and error types (always included)
//! - [`sentence`]: Sentence decoding (always included)
//! - [`filter`]: Altitude filter policy (always included)
//! - [`transport`]: Sockets (requires `transport` feature)
//! - [`session`]: Run loop and lifecycle (requires `session` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use flarm_relay::prelude::*;
//!
//! let distance = parse_relative_vertical("$PFLAA,2,1,1,100,5*3F");
//! assert_eq!(distance, Some(100));
//!
//! let policy = FilterPolicy::new(true, 500);
//! assert!(policy.should_forward(distance));
//! assert!(!policy.should_forward(parse_relative_vertical("$PFLAA,2,1,1,800,5*3F")));
//!
//! // Lines without a distance only pass when filtering is off
//! assert!(!policy.should_forward(parse_relative_vertical("$GPGGA,1,2,3*00")));
//! assert!(FilterPolicy::pass_through().should_forward(None));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Pure decoding and policy (always included)
pub mod filter;
pub mod sentence;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Forwarding session (feature-gated)
#[cfg(feature = "session")]
#[cfg_attr(docsrs, doc(cfg(feature = "session")))]
pub mod session;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::filter::*;
    pub use crate::sentence::*;

    #[cfg(feature = "transport")]
    pub use crate::transport::{DatagramSender, LineReader, RawLine};

    #[cfg(feature = "session")]
    pub use crate::session::*;
}

// Re-export commonly used items at crate root
pub use core::{RelayError, RelayResult, TerminationReason};
pub use filter::{FilterPolicy, should_forward};
pub use sentence::{TrafficSentence, parse_relative_vertical};

#[cfg(feature = "session")]
pub use session::{
    ForwardingSession, RelayConfig, SessionHandle, SessionHost, SessionState, SessionSummary,
};
