//! The forwarding run loop.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::RelayConfig;
use super::host::SessionHandle;
use super::state::SessionState;
use super::stats::{SessionStats, StatsSnapshot};
use crate::core::{RelayError, RelayResult, TerminationReason};
use crate::filter::FilterPolicy;
use crate::sentence::parse_relative_vertical_bytes;
use crate::transport::{DatagramSender, LineReader, RawLine};

/// Outcome of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Why the session ended.
    pub reason: TerminationReason,
    /// Counters at the time it ended.
    pub stats: StatsSnapshot,
}

/// One run of connect → relay → terminate.
///
/// The session exclusively owns the source connection and the datagram
/// endpoint. Both are released before `Terminated` is published, on every
/// exit path.
///
/// # Example
///
/// ```ignore
/// use flarm_relay::session::{ForwardingSession, RelayConfig};
///
/// let handle = ForwardingSession::new(RelayConfig::default()).spawn();
///
/// // Later, from anywhere
/// handle.stop();
/// let summary = handle.wait().await;
/// ```
#[derive(Debug)]
pub struct ForwardingSession {
    /// Session configuration.
    config: RelayConfig,

    /// Filter applied to every line.
    policy: FilterPolicy,

    /// Published state. The session is the only writer.
    state: watch::Sender<SessionState>,

    /// Receives every transition, in order.
    notifier: Option<mpsc::UnboundedSender<SessionState>>,

    /// Stop signal.
    cancel: CancellationToken,

    /// Counters.
    stats: Arc<SessionStats>,
}

impl ForwardingSession {
    /// Create an idle session.
    pub fn new(config: RelayConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        let policy = config.filter_policy();

        Self {
            config,
            policy,
            state,
            notifier: None,
            cancel: CancellationToken::new(),
            stats: Arc::new(SessionStats::new()),
        }
    }

    /// Report every state transition to `notifier`.
    ///
    /// Unlike [`SessionHandle::subscribe`], no intermediate state is
    /// coalesced away.
    pub fn with_notifier(mut self, notifier: mpsc::UnboundedSender<SessionState>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Handle for observing and stopping this session.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(
            self.state.subscribe(),
            self.cancel.clone(),
            Arc::clone(&self.stats),
        )
    }

    /// Session configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run the session on a new tokio task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> SessionHandle {
        let handle = self.handle();
        tokio::spawn(self.run());
        handle
    }

    /// Run the session to completion on the current task.
    pub async fn run(self) -> SessionSummary {
        if self.config.proximity_alert {
            debug!("Proximity alert requested; it has no effect on forwarding");
        }

        let reason = self.drive().await;
        self.transition(SessionState::Terminated(reason));

        let stats = self.stats.snapshot();
        info!(
            source = %self.config.source_addr(),
            destination = %self.config.destination_addr(),
            reason = %reason,
            received = stats.lines_received,
            forwarded = stats.lines_forwarded,
            dropped = stats.lines_dropped,
            send_failures = stats.send_failures,
            "Forwarding session terminated"
        );

        SessionSummary { reason, stats }
    }

    /// Everything up to, but not including, the terminal transition.
    ///
    /// Both sockets are dropped before this returns.
    async fn drive(&self) -> TerminationReason {
        self.transition(SessionState::Connecting);

        let (mut reader, mut sender) = match self.open().await {
            Ok(Some(resources)) => resources,
            Ok(None) => {
                self.transition(SessionState::Stopping);
                return TerminationReason::Cancelled;
            }
            Err(e) => {
                error!(error = %e, "Forwarding session could not start");
                return e
                    .termination_reason()
                    .unwrap_or(TerminationReason::ConnectFailure);
            }
        };

        self.transition(SessionState::Running);
        info!(
            peer = %reader.peer_addr(),
            local = ?sender.local_addr(),
            destination = %sender.destination(),
            filter = self.policy.enabled,
            altitude_limit = self.policy.altitude_limit,
            "Forwarding"
        );

        let reason = self.forward(&mut reader, &sender).await;
        if reason == TerminationReason::Cancelled {
            self.transition(SessionState::Stopping);
        }

        reader.close();
        sender.close();
        reason
    }

    /// Connect to the source and bind the datagram endpoint.
    ///
    /// Returns `Ok(None)` if a stop was requested first.
    async fn open(&self) -> RelayResult<Option<(LineReader, DatagramSender)>> {
        let config = &self.config;
        let connect = async {
            let reader = LineReader::connect(
                &config.source_host,
                config.source_port,
                config.connect_timeout,
            )
            .await?;
            let sender =
                DatagramSender::bind(&config.destination_host, config.destination_port).await?;
            Ok::<_, RelayError>((reader, sender))
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Ok(None),
            result = connect => result.map(Some),
        }
    }

    /// Relay lines until the source ends, faults, or a stop is requested.
    async fn forward(&self, reader: &mut LineReader, sender: &DatagramSender) -> TerminationReason {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return TerminationReason::Cancelled,
                next = reader.next_line() => next,
            };

            match next {
                Ok(Some(line)) => self.relay(&line, sender).await,
                Ok(None) => return TerminationReason::EndOfStream,
                Err(e) => {
                    error!(error = %e, "Traffic source failed");
                    return e
                        .termination_reason()
                        .unwrap_or(TerminationReason::ReadFailure);
                }
            }
        }
    }

    /// Parse, filter and, if accepted, send one line.
    async fn relay(&self, line: &RawLine, sender: &DatagramSender) {
        self.stats.record_received();

        let distance = parse_relative_vertical_bytes(line.as_bytes());
        if !self.policy.should_forward(distance) {
            self.stats.record_dropped();
            debug!(line = %line.to_text_lossy(), distance = ?distance, "Dropped");
            return;
        }

        match sender.send(line.as_bytes()).await {
            Ok(sent) => {
                self.stats.record_forwarded(sent);
                debug!(line = %line.to_text_lossy(), distance = ?distance, "Forwarded");
            }
            Err(e) => {
                self.stats.record_send_failure();
                warn!(error = %e, bytes = line.len(), "Datagram lost");
            }
        }
    }

    /// Publish a new state. The notifier hears about it first, so anyone
    /// woken by the watch channel finds the notification already queued.
    fn transition(&self, next: SessionState) {
        if let Some(notifier) = &self.notifier {
            // The host may have stopped listening; that does not affect the session
            let _ = notifier.send(next);
        }

        let previous = self.state.send_replace(next);
        debug!(from = %previous, to = %next, "Session state changed");
    }
}
