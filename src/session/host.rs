//! Host-facing boundary: start, stop, observe.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::config::RelayConfig;
use super::session::{ForwardingSession, SessionSummary};
use super::state::SessionState;
use super::stats::{SessionStats, StatsSnapshot};
use crate::core::{RelayError, RelayResult, TerminationReason};

/// Handle to a running or finished session.
///
/// Cheap to clone. Dropping every handle does not stop the session; call
/// [`stop`](Self::stop) for that.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    state: watch::Receiver<SessionState>,
    cancel: CancellationToken,
    stats: Arc<SessionStats>,
}

impl SessionHandle {
    pub(crate) fn new(
        state: watch::Receiver<SessionState>,
        cancel: CancellationToken,
        stats: Arc<SessionStats>,
    ) -> Self {
        Self {
            state,
            cancel,
            stats,
        }
    }

    /// Current state. Never blocks.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver that is notified whenever the state changes.
    ///
    /// Observers that fall behind only see the latest state. Use
    /// [`ForwardingSession::with_notifier`] to receive every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Current counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Request the session to stop.
    ///
    /// Returns immediately. The session notices the request at its next
    /// suspension point. Stopping a finished session does nothing.
    pub fn stop(&self) {
        if self.state().is_terminated() || self.cancel.is_cancelled() {
            return;
        }
        info!(state = %self.state(), "Stop requested");
        self.cancel.cancel();
    }

    /// Check if a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait until the session has terminated.
    pub async fn wait(&self) -> SessionSummary {
        let mut state = self.state.clone();
        let reason = match state.wait_for(SessionState::is_terminated).await {
            Ok(terminal) => terminal.termination_reason(),
            Err(_) => None,
        };

        let reason = reason.unwrap_or_else(|| {
            // Only reachable if the worker task panicked
            error!("Session worker exited without reaching a terminal state");
            TerminationReason::ReadFailure
        });

        SessionSummary {
            reason,
            stats: self.stats.snapshot(),
        }
    }
}

/// Starts sessions on behalf of an external host, one at a time.
///
/// # Example
///
/// ```ignore
/// use flarm_relay::session::{RelayConfig, SessionHost};
///
/// let mut host = SessionHost::new();
/// let handle = host.start(RelayConfig::default())?;
///
/// assert!(host.start(RelayConfig::default()).is_err());
///
/// host.stop();
/// handle.wait().await;
/// ```
#[derive(Debug, Default)]
pub struct SessionHost {
    /// Most recently started session.
    current: Option<SessionHandle>,

    /// Forwarded to every session this host starts.
    notifier: Option<mpsc::UnboundedSender<SessionState>>,
}

impl SessionHost {
    /// Create a host with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host whose sessions report every transition to `notifier`.
    pub fn with_notifier(notifier: mpsc::UnboundedSender<SessionState>) -> Self {
        Self {
            current: None,
            notifier: Some(notifier),
        }
    }

    /// Start a new session.
    ///
    /// Fails with [`RelayError::SessionActive`] while the previous session
    /// has not terminated, and with [`RelayError::Config`] for an unusable
    /// configuration. Must be called from within a tokio runtime.
    pub fn start(&mut self, config: RelayConfig) -> RelayResult<SessionHandle> {
        if let Some(current) = &self.current {
            if !current.state().is_terminated() {
                return Err(RelayError::SessionActive);
            }
        }

        config.validate()?;

        info!(
            source = %config.source_addr(),
            destination = %config.destination_addr(),
            filter = config.filter_enabled,
            altitude_limit = config.altitude_limit,
            "Starting forwarding session"
        );

        let mut session = ForwardingSession::new(config);
        if let Some(notifier) = &self.notifier {
            session = session.with_notifier(notifier.clone());
        }

        let handle = session.spawn();
        self.current = Some(handle.clone());
        Ok(handle)
    }

    /// Request the current session to stop, if there is one.
    pub fn stop(&self) {
        if let Some(current) = &self.current {
            current.stop();
        }
    }

    /// State of the current session, `Idle` if none was started.
    pub fn observe(&self) -> SessionState {
        self.current
            .as_ref()
            .map(SessionHandle::state)
            .unwrap_or(SessionState::Idle)
    }

    /// Handle of the most recently started session.
    pub fn current(&self) -> Option<&SessionHandle> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::{TcpListener, UdpSocket};

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    async fn endpoints() -> (TcpListener, UdpSocket, RelayConfig) {
        let source = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let consumer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = RelayConfig::builder()
            .source("127.0.0.1", source.local_addr().unwrap().port())
            .destination("127.0.0.1", consumer.local_addr().unwrap().port())
            .build();
        (source, consumer, config)
    }

    #[test]
    fn test_idle_host() {
        let host = SessionHost::new();
        assert_eq!(host.observe(), SessionState::Idle);
        assert!(host.current().is_none());
        // Nothing to stop
        host.stop();
    }

    #[tokio::test]
    async fn test_one_session_at_a_time() {
        let (source, _consumer, config) = endpoints().await;
        let mut host = SessionHost::new();

        let handle = host.start(config.clone()).unwrap();
        assert!(matches!(
            host.start(config.clone()),
            Err(RelayError::SessionActive)
        ));

        let (_peer, _) = tokio::time::timeout(WAIT, source.accept())
            .await
            .unwrap()
            .unwrap();

        host.stop();
        let summary = tokio::time::timeout(WAIT, handle.wait()).await.unwrap();
        assert_eq!(summary.reason, TerminationReason::Cancelled);
        assert_eq!(
            host.observe(),
            SessionState::Terminated(TerminationReason::Cancelled)
        );

        // A finished session frees the host for a fresh one
        let next = host.start(config).unwrap();
        assert!(!next.state().is_terminated());
        next.stop();
        tokio::time::timeout(WAIT, next.wait()).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut host = SessionHost::new();
        let config = RelayConfig::builder().source("", 10113).build();

        assert!(matches!(host.start(config), Err(RelayError::Config(_))));
        assert_eq!(host.observe(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_host_notifier_sees_terminal_state() {
        let (source, _consumer, config) = endpoints().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut host = SessionHost::with_notifier(tx);

        let handle = host.start(config).unwrap();
        let (peer, _) = tokio::time::timeout(WAIT, source.accept())
            .await
            .unwrap()
            .unwrap();
        drop(peer);

        let summary = tokio::time::timeout(WAIT, handle.wait()).await.unwrap();
        assert_eq!(summary.reason, TerminationReason::EndOfStream);

        let mut last = None;
        while let Ok(state) = rx.try_recv() {
            last = Some(state);
        }
        assert_eq!(
            last,
            Some(SessionState::Terminated(TerminationReason::EndOfStream))
        );
    }

    #[tokio::test]
    async fn test_stop_after_termination_keeps_reason() {
        let (source, _consumer, config) = endpoints().await;
        let mut host = SessionHost::new();

        let handle = host.start(config).unwrap();
        drop(tokio::time::timeout(WAIT, source.accept()).await.unwrap().unwrap());
        tokio::time::timeout(WAIT, handle.wait()).await.unwrap();

        host.stop();
        handle.stop();
        assert!(!handle.is_stop_requested());
        assert_eq!(
            host.observe(),
            SessionState::Terminated(TerminationReason::EndOfStream)
        );
    }
}
