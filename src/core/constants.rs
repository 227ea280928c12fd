//! Wire and addressing constants.
//!
//! Defaults match what the traffic-data producer and the datagram consumer
//! expect when both run on the same device.

use std::time::Duration;

// =============================================================================
// SENTENCE FORMAT
// =============================================================================

/// Optional marker preceding the sentence kind.
pub const SENTENCE_START: char = '$';

/// Start of the checksum suffix. Everything from here on is ignored.
pub const CHECKSUM_DELIMITER: char = '*';

/// Field separator.
pub const FIELD_SEPARATOR: char = ',';

/// Sentence kind of a FLARM traffic report.
pub const TRAFFIC_REPORT_KIND: &str = "PFLAA";

/// Token index (kind included) of the relative vertical distance.
pub const RELATIVE_VERTICAL_INDEX: usize = 4;

// =============================================================================
// ADDRESSING
// =============================================================================

/// Default host of the TCP traffic source.
pub const DEFAULT_SOURCE_HOST: &str = "127.0.0.1";

/// Default port of the TCP traffic source.
pub const DEFAULT_SOURCE_PORT: u16 = 10113;

/// Default host of the UDP consumer.
pub const DEFAULT_DESTINATION_HOST: &str = "127.0.0.1";

/// Default port of the UDP consumer.
pub const DEFAULT_DESTINATION_PORT: u16 = 10112;

// =============================================================================
// SESSION
// =============================================================================

/// Bound on the initial TCP connect, in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3000;

/// Bound on the initial TCP connect (resolution included).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS);

/// Default altitude band, in meters above and below the receiver.
pub const DEFAULT_ALTITUDE_LIMIT: u32 = 500;

/// Filtering is on unless explicitly disabled.
pub const DEFAULT_FILTER_ENABLED: bool = true;

/// Initial capacity of the line buffer used by the stream reader.
pub const LINE_BUFFER_CAPACITY: usize = 256;
