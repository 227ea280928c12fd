//! Command-line arguments.
//!
//! Every flag falls back to a `FLARM_RELAY_*` environment variable, so the
//! relay can be configured entirely from the environment when launched by
//! another app.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{ArgAction, Parser};
use flarm_relay::core::{
    DEFAULT_ALTITUDE_LIMIT, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DESTINATION_HOST,
    DEFAULT_DESTINATION_PORT, DEFAULT_SOURCE_HOST, DEFAULT_SOURCE_PORT,
};
use flarm_relay::session::RelayConfig;
use flarm_relay::RelayResult;

#[derive(Debug, Parser)]
#[command(name = "flarm-relay")]
#[command(about = "Forward FLARM traffic sentences from a TCP stream to a UDP destination")]
#[command(version)]
pub struct Args {
    /// Host of the TCP traffic source
    #[arg(long, env = "FLARM_RELAY_SOURCE_HOST", default_value = DEFAULT_SOURCE_HOST)]
    pub source_host: String,

    /// Port of the TCP traffic source
    #[arg(long, env = "FLARM_RELAY_SOURCE_PORT", default_value_t = DEFAULT_SOURCE_PORT)]
    pub source_port: u16,

    /// Host of the UDP consumer
    #[arg(long, env = "FLARM_RELAY_DESTINATION_HOST", default_value = DEFAULT_DESTINATION_HOST)]
    pub destination_host: String,

    /// Port of the UDP consumer
    #[arg(long, env = "FLARM_RELAY_DESTINATION_PORT", default_value_t = DEFAULT_DESTINATION_PORT)]
    pub destination_port: u16,

    /// Give up connecting to the source after this many milliseconds
    #[arg(long, env = "FLARM_RELAY_CONNECT_TIMEOUT_MS", default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,

    /// Forward traffic within this many meters above or below
    #[arg(long, env = "FLARM_RELAY_ALTITUDE_LIMIT", default_value_t = DEFAULT_ALTITUDE_LIMIT)]
    pub altitude_limit: u32,

    /// Enforce the altitude limit (false forwards every line)
    #[arg(
        long,
        env = "FLARM_RELAY_FILTER",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub filter: bool,

    /// Proximity alert (accepted, currently has no effect)
    #[arg(
        long,
        env = "FLARM_RELAY_PROXIMITY_ALERT",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub proximity_alert: bool,

    /// Serve session status over HTTP on this address
    #[arg(long, env = "FLARM_RELAY_STATUS_ADDR")]
    pub status_addr: Option<SocketAddr>,

    /// Log session counters every N seconds (0 = never)
    #[arg(long, env = "FLARM_RELAY_STATS_INTERVAL", default_value_t = 0)]
    pub stats_interval: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "FLARM_RELAY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Build the session configuration.
    pub fn relay_config(&self) -> RelayResult<RelayConfig> {
        RelayConfig::builder()
            .source(&self.source_host, self.source_port)
            .destination(&self.destination_host, self.destination_port)
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .altitude_limit(self.altitude_limit)
            .filter_enabled(self.filter)
            .proximity_alert(self.proximity_alert)
            .try_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_library() {
        let args = Args::try_parse_from(["flarm-relay"]).unwrap();
        assert_eq!(args.relay_config().unwrap(), RelayConfig::default());
        assert_eq!(
            Duration::from_millis(args.connect_timeout_ms),
            flarm_relay::core::DEFAULT_CONNECT_TIMEOUT
        );
        assert!(args.status_addr.is_none());
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "flarm-relay",
            "--source-port",
            "4353",
            "--destination-host",
            "192.168.1.20",
            "--altitude-limit",
            "250",
            "--filter",
            "false",
            "--status-addr",
            "127.0.0.1:8080",
        ])
        .unwrap();

        let config = args.relay_config().unwrap();
        assert_eq!(config.source_addr(), "127.0.0.1:4353");
        assert_eq!(config.destination_addr(), "192.168.1.20:10112");
        assert_eq!(config.altitude_limit, 250);
        assert!(!config.filter_enabled);
        assert_eq!(args.status_addr, Some("127.0.0.1:8080".parse().unwrap()));
    }

    #[test]
    fn test_invalid_values() {
        assert!(Args::try_parse_from(["flarm-relay", "--altitude-limit", "-5"]).is_err());
        assert!(Args::try_parse_from(["flarm-relay", "--source-port", "70000"]).is_err());

        let args = Args::try_parse_from(["flarm-relay", "--connect-timeout-ms", "0"]).unwrap();
        assert!(args.relay_config().is_err());
    }
}
