//! FLARM Relay - Transport Layer
//!
//! Owns both sockets of a forwarding session:
//!
//! - **Stream reader**: [`LineReader`] dials the TCP traffic source and yields
//!   newline-framed [`RawLine`]s until the peer closes or faults
//! - **Datagram sender**: [`DatagramSender`] binds an ephemeral UDP endpoint
//!   and transmits payloads to one fixed destination
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   lines   ┌─────────────┐  datagrams  ┌──────────────┐
//! │ TCP source   │ ────────► │   session   │ ──────────► │ UDP consumer │
//! │ (LineReader) │           │ parse/filter│             │ (Datagram-   │
//! └──────────────┘           └─────────────┘             │  Sender)     │
//!                                                        └──────────────┘
//! ```
//!
//! Neither type retries. A failed connect or a read fault is reported once
//! and the owning session decides what happens next.

mod reader;
mod sender;

pub use reader::*;
pub use sender::*;
