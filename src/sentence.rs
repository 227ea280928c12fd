//! FLARM sentence decoding.
//!
//! Only one sentence kind is interpreted: the `PFLAA` traffic report, and
//! only its relative vertical distance. Every other field passes through the
//! relay unexamined.
//!
//! ```text
//! $PFLAA,<alarm>,<rel north>,<rel east>,<rel vertical>,...*<checksum>
//!   [0]     [1]      [2]        [3]         [4]
//! ```
//!
//! Decoding never fails. A line that does not look like a traffic report
//! simply has no distance.

use std::borrow::Cow;

use crate::core::{
    CHECKSUM_DELIMITER, FIELD_SEPARATOR, RELATIVE_VERTICAL_INDEX, SENTENCE_START,
    TRAFFIC_REPORT_KIND,
};

/// Relative vertical distance to another aircraft, in meters.
pub type RelativeVerticalDistance = i32;

/// A decoded sentence, borrowing from the raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficSentence<'a> {
    kind: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> TrafficSentence<'a> {
    /// Decode a line.
    ///
    /// Strips a single leading `$`, drops everything from the first `*`
    /// and splits the remainder on `,`. The first token is the kind.
    pub fn parse(line: &'a str) -> Self {
        let body = line.strip_prefix(SENTENCE_START).unwrap_or(line);
        let body = match body.find(CHECKSUM_DELIMITER) {
            Some(end) => &body[..end],
            None => body,
        };

        let mut tokens = body.split(FIELD_SEPARATOR);
        // split always yields at least one token, possibly empty
        let kind = tokens.next().unwrap_or_default();

        Self {
            kind,
            fields: tokens.collect(),
        }
    }

    /// Sentence kind, e.g. `PFLAA`.
    pub fn kind(&self) -> &'a str {
        self.kind
    }

    /// Tokens following the kind.
    pub fn fields(&self) -> &[&'a str] {
        &self.fields
    }

    /// Token by index, counting the kind as index 0.
    pub fn token(&self, index: usize) -> Option<&'a str> {
        match index {
            0 => Some(self.kind),
            i => self.fields.get(i - 1).copied(),
        }
    }

    /// Check if this is a traffic report carrying a vertical-distance field.
    pub fn is_traffic_report(&self) -> bool {
        self.kind == TRAFFIC_REPORT_KIND && self.token(RELATIVE_VERTICAL_INDEX).is_some()
    }

    /// Relative vertical distance, if this is a traffic report and the
    /// field is a base-10 integer.
    pub fn relative_vertical(&self) -> Option<RelativeVerticalDistance> {
        if !self.is_traffic_report() {
            return None;
        }
        self.token(RELATIVE_VERTICAL_INDEX)?.parse().ok()
    }
}

/// Extract the relative vertical distance from a line.
pub fn parse_relative_vertical(line: &str) -> Option<RelativeVerticalDistance> {
    TrafficSentence::parse(line).relative_vertical()
}

/// Extract the relative vertical distance from raw line bytes.
///
/// Invalid UTF-8 is replaced before decoding, so a corrupted line yields
/// `None` unless the damage is outside the interpreted fields.
pub fn parse_relative_vertical_bytes(line: &[u8]) -> Option<RelativeVerticalDistance> {
    let text: Cow<'_, str> = String::from_utf8_lossy(line);
    parse_relative_vertical(&text)
}
