//! Session lifecycle state.

use crate::core::TerminationReason;

/// Lifecycle of a forwarding session.
///
/// ```text
/// Idle ─► Connecting ─► Running ─► Terminated(EndOfStream | ReadFailure)
///             │            │
///             │            └─► Stopping ─► Terminated(Cancelled)
///             ├─► Stopping ─► Terminated(Cancelled)
///             └─► Terminated(ConnectFailure)
/// ```
///
/// `Terminated` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Created, not started.
    Idle,
    /// Dialing the source and preparing the datagram endpoint.
    Connecting,
    /// Relaying lines.
    Running,
    /// Stop requested, releasing resources.
    Stopping,
    /// Finished. Both sockets are released.
    Terminated(TerminationReason),
}

impl SessionState {
    /// Check if the session has finished.
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated(_))
    }

    /// Check if the session holds, or is acquiring, resources.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Connecting | SessionState::Running | SessionState::Stopping
        )
    }

    /// Terminal reason, if finished.
    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match self {
            SessionState::Terminated(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Stable lowercase name, used in logs and status reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Running => "running",
            SessionState::Stopping => "stopping",
            SessionState::Terminated(_) => "terminated",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Terminated(reason) => write!(f, "terminated ({})", reason),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(!SessionState::Idle.is_active());
        assert!(SessionState::Connecting.is_active());
        assert!(SessionState::Running.is_active());
        assert!(SessionState::Stopping.is_active());

        let done = SessionState::Terminated(TerminationReason::EndOfStream);
        assert!(done.is_terminated());
        assert!(!done.is_active());
        assert_eq!(done.termination_reason(), Some(TerminationReason::EndOfStream));
        assert_eq!(SessionState::Running.termination_reason(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionState::Running.to_string(), "running");
        assert_eq!(
            SessionState::Terminated(TerminationReason::Cancelled).to_string(),
            "terminated (cancelled)"
        );
    }
}
