//! Error types for FLARM Relay.

use std::io;

use thiserror::Error;

/// Errors raised by the relay.
///
/// Only [`RelayError::ConnectFailure`] and [`RelayError::ReadFailure`] end a
/// session. Everything else is either absorbed by the run loop or reported
/// back to the caller of a host operation.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The source connection could not be established within the timeout.
    #[error("connect to {addr} failed: {source}")]
    ConnectFailure {
        /// Address that was dialed.
        addr: String,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// The source connection faulted after it was established.
    #[error("read from source failed: {0}")]
    ReadFailure(#[source] io::Error),

    /// A single datagram could not be transmitted.
    #[error("send to {addr} failed: {source}")]
    SendFailure {
        /// Destination of the datagram.
        addr: String,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// The datagram endpoint could not be prepared.
    #[error("datagram setup for {addr} failed: {source}")]
    DestinationSetup {
        /// Destination that was being resolved.
        addr: String,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A session is already active for this host.
    #[error("a forwarding session is already active")]
    SessionActive,
}

impl RelayError {
    /// Check if this error ends a forwarding session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RelayError::ConnectFailure { .. }
                | RelayError::ReadFailure(_)
                | RelayError::DestinationSetup { .. }
        )
    }

    /// Terminal reason reported to the host for a fatal error.
    ///
    /// Returns `None` for errors that never end a session.
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match self {
            RelayError::ConnectFailure { .. } | RelayError::DestinationSetup { .. } => {
                Some(TerminationReason::ConnectFailure)
            }
            RelayError::ReadFailure(_) => Some(TerminationReason::ReadFailure),
            _ => None,
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Why a forwarding session ended.
///
/// This is the only failure information a host ever receives, so alternate
/// implementations stay interchangeable at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// The source closed the connection cleanly.
    EndOfStream,
    /// A stop request was honored.
    Cancelled,
    /// The source could not be reached or the destination could not be set up.
    ConnectFailure,
    /// The source connection faulted mid-stream.
    ReadFailure,
}

impl TerminationReason {
    /// Check if the session ended abnormally.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            TerminationReason::ConnectFailure | TerminationReason::ReadFailure
        )
    }

    /// Stable lowercase name, used in logs and status reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::EndOfStream => "end_of_stream",
            TerminationReason::Cancelled => "cancelled",
            TerminationReason::ConnectFailure => "connect_failure",
            TerminationReason::ReadFailure => "read_failure",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "test")
    }

    #[test]
    fn test_fatal_errors() {
        assert!(RelayError::ConnectFailure {
            addr: "127.0.0.1:1".into(),
            source: io_err()
        }
        .is_fatal());
        assert!(RelayError::ReadFailure(io_err()).is_fatal());
        assert!(RelayError::DestinationSetup {
            addr: "nowhere:1".into(),
            source: io_err()
        }
        .is_fatal());

        assert!(!RelayError::SendFailure {
            addr: "127.0.0.1:1".into(),
            source: io_err()
        }
        .is_fatal());
        assert!(!RelayError::Config("bad".into()).is_fatal());
        assert!(!RelayError::SessionActive.is_fatal());
    }

    #[test]
    fn test_termination_reason_mapping() {
        assert_eq!(
            RelayError::ReadFailure(io_err()).termination_reason(),
            Some(TerminationReason::ReadFailure)
        );
        assert_eq!(
            RelayError::DestinationSetup {
                addr: "nowhere:1".into(),
                source: io_err()
            }
            .termination_reason(),
            Some(TerminationReason::ConnectFailure)
        );
        assert_eq!(
            RelayError::SendFailure {
                addr: "127.0.0.1:1".into(),
                source: io_err()
            }
            .termination_reason(),
            None
        );
    }

    #[test]
    fn test_reason_classification() {
        assert!(TerminationReason::ConnectFailure.is_error());
        assert!(TerminationReason::ReadFailure.is_error());
        assert!(!TerminationReason::EndOfStream.is_error());
        assert!(!TerminationReason::Cancelled.is_error());
        assert_eq!(TerminationReason::EndOfStream.to_string(), "end_of_stream");
    }
}
