//! FLARM Relay command-line host.
//!
//! Starts one forwarding session from flags or `FLARM_RELAY_*` environment
//! variables, logs its status, and stops it on Ctrl-C. Exits non-zero if
//! the session ended with a connect or read failure.
//!
//! ```bash
//! # Relay with the default ports, keeping traffic within ±300 m
//! flarm-relay --altitude-limit 300
//!
//! # Forward everything and expose status on :8080
//! FLARM_RELAY_FILTER=false flarm-relay --status-addr 127.0.0.1:8080
//! ```

mod cli;
mod status;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use flarm_relay::session::{SessionHandle, SessionHost, SessionSummary};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Args;
use status::{StatusState, start_status_server};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.relay_config().context("invalid relay configuration")?;

    let (notifier, mut transitions) = mpsc::unbounded_channel();
    let mut host = SessionHost::with_notifier(notifier);
    let handle = host.start(config)?;

    tokio::spawn(async move {
        while let Some(state) = transitions.recv().await {
            info!(state = %state, "Session status");
        }
    });

    if let Some(addr) = args.status_addr {
        let state = StatusState::new(handle.clone());
        tokio::spawn(async move {
            if let Err(e) = start_status_server(addr, state).await {
                error!(error = %e, "Status server failed");
            }
        });
    }

    if args.stats_interval > 0 {
        spawn_stats_logger(handle.clone(), Duration::from_secs(args.stats_interval));
    }

    let summary = tokio::select! {
        summary = handle.wait() => summary,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping session");
            host.stop();
            handle.wait().await
        }
    };

    report(&summary)
}

/// Log the session counters periodically until the session ends.
fn spawn_stats_logger(handle: SessionHandle, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            if handle.state().is_terminated() {
                break;
            }
            let stats = handle.stats();
            info!(
                received = stats.lines_received,
                forwarded = stats.lines_forwarded,
                dropped = stats.lines_dropped,
                send_failures = stats.send_failures,
                "Relay metrics"
            );
        }
    });
}

fn report(summary: &SessionSummary) -> Result<()> {
    println!(
        "Session ended ({}): {} received, {} forwarded, {} dropped, {} send failures",
        summary.reason,
        summary.stats.lines_received,
        summary.stats.lines_forwarded,
        summary.stats.lines_dropped,
        summary.stats.send_failures,
    );

    if summary.reason.is_error() {
        bail!("forwarding session failed: {}", summary.reason);
    }
    Ok(())
}
