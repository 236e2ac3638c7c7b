//! Wall-clock access in Unix seconds.
//!
//! Every time-dependent store operation has an `_at` variant taking an
//! explicit timestamp; these helpers supply the real clock for the
//! convenience wrappers.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current UTC time as fractional Unix seconds.
pub fn now_unix_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Seconds in one day — the recall recency half-life scale.
pub const DAY_SECS: f64 = 86_400.0;

/// Seconds in seven days — the evolution fade horizon.
pub const WEEK_SECS: f64 = 7.0 * 86_400.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(now_unix_secs() > 1_577_836_800.0);
    }

    #[test]
    fn test_week_is_seven_days() {
        assert_eq!(WEEK_SECS, 7.0 * DAY_SECS);
    }
}
