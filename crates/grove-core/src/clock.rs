//! Wall-clock helpers.
//!
//! Every duration comparison in the crate runs on epoch milliseconds.
//! Components never read the clock themselves -- `tick(now_ms)` takes the
//! timestamp from the caller, so state transitions are pure functions of
//! time and tests never sleep. The control loop is the only caller of
//! [`now_ms`].

pub const MS_PER_SEC: u64 = 1_000;
pub const MS_PER_MIN: u64 = 60 * MS_PER_SEC;
pub const MS_PER_DAY: u64 = 24 * 60 * MS_PER_MIN;

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Calendar-day index used to seed the daily season pick.
pub fn day_index(now_ms: u64) -> u64 {
    now_ms / MS_PER_DAY
}

/// Window index for the drifting particle field: constant for `window_ms`
/// at a time so the field appears to move slowly instead of flickering.
pub fn drift_window(now_ms: u64, window_ms: u64) -> u64 {
    if window_ms == 0 {
        return now_ms;
    }
    now_ms / window_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_index_changes_at_midnight() {
        let just_before = MS_PER_DAY - 1;
        let just_after = MS_PER_DAY;
        assert_eq!(day_index(just_before) + 1, day_index(just_after));
    }

    #[test]
    fn drift_window_is_stable_within_window() {
        let w = 30 * MS_PER_SEC;
        assert_eq!(drift_window(1_000, w), drift_window(29_999, w));
        assert_ne!(drift_window(29_999, w), drift_window(30_000, w));
    }

    #[test]
    fn drift_window_zero_passes_through() {
        assert_eq!(drift_window(1234, 0), 1234);
    }
}
