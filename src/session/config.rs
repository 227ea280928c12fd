//! Session configuration.

use std::time::Duration;

use crate::core::{
    DEFAULT_ALTITUDE_LIMIT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_DESTINATION_HOST,
    DEFAULT_DESTINATION_PORT, DEFAULT_FILTER_ENABLED, DEFAULT_SOURCE_HOST, DEFAULT_SOURCE_PORT,
    RelayError, RelayResult,
};
use crate::filter::FilterPolicy;

/// Configuration of one forwarding session.
///
/// Immutable once the session starts; a new session is needed to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Host of the TCP traffic source.
    pub source_host: String,

    /// Port of the TCP traffic source.
    pub source_port: u16,

    /// Host of the UDP consumer.
    pub destination_host: String,

    /// Port of the UDP consumer.
    pub destination_port: u16,

    /// Bound on the initial connect.
    pub connect_timeout: Duration,

    /// Half-width of the forwarded altitude band, in meters.
    pub altitude_limit: u32,

    /// Enforce the altitude band.
    pub filter_enabled: bool,

    /// Accepted for compatibility with existing hosts. Has no effect.
    pub proximity_alert: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            source_host: DEFAULT_SOURCE_HOST.to_string(),
            source_port: DEFAULT_SOURCE_PORT,
            destination_host: DEFAULT_DESTINATION_HOST.to_string(),
            destination_port: DEFAULT_DESTINATION_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            altitude_limit: DEFAULT_ALTITUDE_LIMIT,
            filter_enabled: DEFAULT_FILTER_ENABLED,
            proximity_alert: false,
        }
    }
}

impl RelayConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::new()
    }

    /// `host:port` of the source.
    pub fn source_addr(&self) -> String {
        format!("{}:{}", self.source_host, self.source_port)
    }

    /// `host:port` of the destination.
    pub fn destination_addr(&self) -> String {
        format!("{}:{}", self.destination_host, self.destination_port)
    }

    /// Filter policy derived from this configuration.
    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy::new(self.filter_enabled, self.altitude_limit)
    }

    /// Check the configuration can be used to start a session.
    pub fn validate(&self) -> RelayResult<()> {
        if self.source_host.trim().is_empty() {
            return Err(RelayError::Config("source host is empty".into()));
        }
        if self.source_port == 0 {
            return Err(RelayError::Config("source port must be non-zero".into()));
        }
        if self.destination_host.trim().is_empty() {
            return Err(RelayError::Config("destination host is empty".into()));
        }
        if self.destination_port == 0 {
            return Err(RelayError::Config(
                "destination port must be non-zero".into(),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(RelayError::Config("connect timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// Builder for [`RelayConfig`].
#[derive(Debug)]
pub struct RelayConfigBuilder {
    config: RelayConfig,
}

impl RelayConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: RelayConfig::default(),
        }
    }

    /// Set the source host and port.
    pub fn source(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.source_host = host.into();
        self.config.source_port = port;
        self
    }

    /// Set the destination host and port.
    pub fn destination(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.destination_host = host.into();
        self.config.destination_port = port;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the altitude limit in meters.
    pub fn altitude_limit(mut self, meters: u32) -> Self {
        self.config.altitude_limit = meters;
        self
    }

    /// Enable or disable the altitude filter.
    pub fn filter_enabled(mut self, enabled: bool) -> Self {
        self.config.filter_enabled = enabled;
        self
    }

    /// Set the proximity alert flag.
    pub fn proximity_alert(mut self, enabled: bool) -> Self {
        self.config.proximity_alert = enabled;
        self
    }

    /// Build the configuration without validating it.
    pub fn build(self) -> RelayConfig {
        self.config
    }

    /// Build and validate the configuration.
    pub fn try_build(self) -> RelayResult<RelayConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for RelayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.source_addr(), "127.0.0.1:10113");
        assert_eq!(config.destination_addr(), "127.0.0.1:10112");
        assert_eq!(config.connect_timeout, Duration::from_millis(3000));
        assert_eq!(config.altitude_limit, 500);
        assert!(config.filter_enabled);
        assert!(!config.proximity_alert);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RelayConfig::builder()
            .source("10.0.0.2", 4353)
            .destination("10.0.0.3", 4000)
            .connect_timeout(Duration::from_secs(1))
            .altitude_limit(300)
            .filter_enabled(false)
            .proximity_alert(true)
            .build();

        assert_eq!(config.source_addr(), "10.0.0.2:4353");
        assert_eq!(config.destination_addr(), "10.0.0.3:4000");
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.filter_policy(), FilterPolicy::new(false, 300));
        assert!(config.proximity_alert);
    }

    #[test]
    fn test_validation() {
        assert!(RelayConfig::builder().source("", 1).try_build().is_err());
        assert!(RelayConfig::builder().source("127.0.0.1", 0).try_build().is_err());
        assert!(RelayConfig::builder().destination(" ", 1).try_build().is_err());
        assert!(RelayConfig::builder().destination("127.0.0.1", 0).try_build().is_err());
        assert!(RelayConfig::builder()
            .connect_timeout(Duration::ZERO)
            .try_build()
            .is_err());

        // Zero altitude limit is a valid, if narrow, band
        assert!(RelayConfig::builder().altitude_limit(0).try_build().is_ok());
    }
}
