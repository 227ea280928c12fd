//! Per-session counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the session worker and readable from anywhere.
#[derive(Debug, Default)]
pub struct SessionStats {
    lines_received: AtomicU64,
    lines_forwarded: AtomicU64,
    lines_dropped: AtomicU64,
    send_failures: AtomicU64,
    bytes_forwarded: AtomicU64,
}

impl SessionStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self) {
        self.lines_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forwarded(&self, bytes: usize) {
        self.lines_forwarded.fetch_add(1, Ordering::Relaxed);
        self.bytes_forwarded
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.lines_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_received: self.lines_received.load(Ordering::Relaxed),
            lines_forwarded: self.lines_forwarded.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            bytes_forwarded: self.bytes_forwarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Lines read from the source.
    pub lines_received: u64,
    /// Lines sent as datagrams.
    pub lines_forwarded: u64,
    /// Lines rejected by the filter.
    pub lines_dropped: u64,
    /// Accepted lines whose datagram could not be sent.
    pub send_failures: u64,
    /// Payload bytes sent.
    pub bytes_forwarded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = SessionStats::new();
        stats.record_received();
        stats.record_received();
        stats.record_received();
        stats.record_forwarded(21);
        stats.record_dropped();
        stats.record_send_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.lines_received, 3);
        assert_eq!(snapshot.lines_forwarded, 1);
        assert_eq!(snapshot.lines_dropped, 1);
        assert_eq!(snapshot.send_failures, 1);
        assert_eq!(snapshot.bytes_forwarded, 21);
    }
}
