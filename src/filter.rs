//! Altitude filter policy.
//!
//! Decides per line whether it is forwarded. With filtering enabled, only
//! traffic within `[-limit, +limit]` meters passes and lines without a
//! distance are dropped. With filtering disabled, everything passes,
//! including lines that are not traffic reports at all.

use crate::core::{DEFAULT_ALTITUDE_LIMIT, DEFAULT_FILTER_ENABLED};
use crate::sentence::RelativeVerticalDistance;

/// Accept/reject rule applied to every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPolicy {
    /// Whether the altitude band is enforced.
    pub enabled: bool,
    /// Half-width of the band, in meters.
    pub altitude_limit: u32,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_FILTER_ENABLED,
            altitude_limit: DEFAULT_ALTITUDE_LIMIT,
        }
    }
}

impl FilterPolicy {
    /// Create a policy.
    pub fn new(enabled: bool, altitude_limit: u32) -> Self {
        Self {
            enabled,
            altitude_limit,
        }
    }

    /// A policy that forwards everything.
    pub fn pass_through() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Decide whether a line with the given parse result is forwarded.
    pub fn should_forward(&self, parsed: Option<RelativeVerticalDistance>) -> bool {
        should_forward(parsed, self.enabled, self.altitude_limit)
    }
}

/// Decide whether a line with the given parse result is forwarded.
pub fn should_forward(
    parsed: Option<RelativeVerticalDistance>,
    filter_enabled: bool,
    limit: u32,
) -> bool {
    if !filter_enabled {
        return true;
    }
    match parsed {
        Some(distance) => i64::from(distance).abs() <= i64::from(limit),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_is_inclusive() {
        assert!(should_forward(Some(500), true, 500));
        assert!(should_forward(Some(-500), true, 500));
        assert!(should_forward(Some(0), true, 500));
        assert!(!should_forward(Some(501), true, 500));
        assert!(!should_forward(Some(-501), true, 500));
    }

    #[test]
    fn test_zero_limit() {
        assert!(should_forward(Some(0), true, 0));
        assert!(!should_forward(Some(1), true, 0));
        assert!(!should_forward(Some(-1), true, 0));
    }

    #[test]
    fn test_unparsed_dropped_when_enabled() {
        assert!(!should_forward(None, true, 500));
        assert!(!should_forward(None, true, u32::MAX));
    }

    #[test]
    fn test_disabled_forwards_everything() {
        for parsed in [None, Some(0), Some(800), Some(i32::MIN), Some(i32::MAX)] {
            assert!(should_forward(parsed, false, 500));
            assert!(should_forward(parsed, false, 0));
        }
    }

    #[test]
    fn test_extreme_values() {
        assert!(should_forward(Some(i32::MIN), true, u32::MAX));
        assert!(should_forward(Some(i32::MAX), true, u32::MAX));
        assert!(!should_forward(Some(i32::MIN), true, i32::MAX as u32));
        assert!(should_forward(Some(i32::MIN + 1), true, i32::MAX as u32));
    }

    #[test]
    fn test_policy_defaults() {
        let policy = FilterPolicy::default();
        assert!(policy.enabled);
        assert_eq!(policy.altitude_limit, 500);
        assert!(policy.should_forward(Some(100)));
        assert!(!policy.should_forward(Some(800)));
        assert!(!policy.should_forward(None));

        let open = FilterPolicy::pass_through();
        assert!(open.should_forward(None));
        assert!(open.should_forward(Some(800)));
    }
}
