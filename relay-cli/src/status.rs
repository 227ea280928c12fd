//! Status endpoint.
//!
//! Serves the state of the forwarding session over HTTP so the surrounding
//! app (or a curious operator) can show what the relay is doing.

use std::net::SocketAddr;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use flarm_relay::session::{SessionHandle, SessionState, StatsSnapshot};
use serde::Serialize;
use tracing::info;

/// Session status as reported over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Whether the session is alive or ended normally.
    pub healthy: bool,
    /// Lifecycle state, e.g. `running`.
    pub state: &'static str,
    /// Terminal reason, once terminated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Session counters.
    pub stats: StatsReport,
}

/// Serializable copy of the session counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsReport {
    pub lines_received: u64,
    pub lines_forwarded: u64,
    pub lines_dropped: u64,
    pub send_failures: u64,
    pub bytes_forwarded: u64,
}

impl From<StatsSnapshot> for StatsReport {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            lines_received: stats.lines_received,
            lines_forwarded: stats.lines_forwarded,
            lines_dropped: stats.lines_dropped,
            send_failures: stats.send_failures,
            bytes_forwarded: stats.bytes_forwarded,
        }
    }
}

impl StatusReport {
    /// Build a report from a session state and counters.
    pub fn new(state: SessionState, stats: StatsSnapshot) -> Self {
        let reason = state.termination_reason();
        Self {
            healthy: !reason.is_some_and(|r| r.is_error()),
            state: state.as_str(),
            reason: reason.map(|r| r.as_str()),
            stats: stats.into(),
        }
    }
}

/// Shared state for the status endpoint.
#[derive(Clone)]
pub struct StatusState {
    session: SessionHandle,
}

impl StatusState {
    /// Report on the given session.
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Get current status.
    pub fn status(&self) -> StatusReport {
        StatusReport::new(self.session.state(), self.session.stats())
    }
}

/// Health check handler.
async fn health_handler(State(state): State<StatusState>) -> impl IntoResponse {
    let status = state.status();
    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// Readiness handler: ready only while lines are being relayed.
async fn ready_handler(State(state): State<StatusState>) -> impl IntoResponse {
    let status = state.status();
    let code = if state.session.state() == SessionState::Running {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// Liveness handler (always returns OK if the process is running).
async fn live_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Full status, always 200.
async fn status_handler(State(state): State<StatusState>) -> impl IntoResponse {
    Json(state.status())
}

/// Build the status router.
pub fn router(state: StatusState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/live", get(live_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Start the status server.
pub async fn start_status_server(bind_addr: SocketAddr, state: StatusState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    info!(address = %bind_addr, "Status server listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
