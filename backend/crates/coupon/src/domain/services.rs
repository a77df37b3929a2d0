//! Domain Services
//!
//! Pure domain logic: cooldown arithmetic and seed code generation.

use std::time::Duration;

/// Remaining cooldown for a signal last seen at `last_claim_ms`.
///
/// Blocked while `now - last < window`; the instant the window has fully
/// elapsed the signal is clear. A clock that moved backwards counts as zero
/// elapsed time.
pub fn cooldown_remaining(last_claim_ms: i64, now_ms: i64, window: Duration) -> Option<Duration> {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    let elapsed_ms = now_ms.saturating_sub(last_claim_ms).max(0);

    if elapsed_ms < window_ms {
        Some(Duration::from_millis((window_ms - elapsed_ms) as u64))
    } else {
        None
    }
}

/// Whole seconds for user-facing messages, rounded up so "0 seconds" is
/// never shown while still blocked.
pub fn ceil_secs(duration: Duration) -> u64 {
    duration.as_millis().div_ceil(1000) as u64
}

/// Codes inserted into an empty pool: `COUPON1..COUPONn`
pub fn seed_codes(count: u32) -> Vec<String> {
    (1..=count).map(|n| format!("COUPON{}", n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_blocked_just_before_window_ends() {
        let t0 = 1_700_000_000_000;
        let remaining = cooldown_remaining(t0, t0 + 60_000 - 1, WINDOW);
        assert_eq!(remaining, Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_clear_after_window() {
        let t0 = 1_700_000_000_000;
        assert_eq!(cooldown_remaining(t0, t0 + 60_000 + 1, WINDOW), None);
        assert_eq!(cooldown_remaining(t0, t0 + 60_000, WINDOW), None);
    }

    #[test]
    fn test_clock_skew_backwards() {
        let t0 = 1_700_000_000_000;
        assert_eq!(cooldown_remaining(t0, t0 - 5_000, WINDOW), Some(WINDOW));
    }

    #[test]
    fn test_zero_window_never_blocks() {
        assert_eq!(cooldown_remaining(0, 0, Duration::ZERO), None);
    }

    #[test]
    fn test_oversized_window_saturates() {
        let t0 = 1_700_000_000_000;
        let huge = Duration::from_secs(u64::MAX);

        let remaining = cooldown_remaining(t0, t0 + 1_000, huge).unwrap();
        assert_eq!(remaining, Duration::from_millis((i64::MAX - 1_000) as u64));
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
        assert_eq!(ceil_secs(Duration::from_millis(1000)), 1);
        assert_eq!(ceil_secs(Duration::from_millis(59_999)), 60);
        assert_eq!(ceil_secs(Duration::ZERO), 0);
    }

    #[test]
    fn test_seed_codes() {
        let codes = seed_codes(3);
        assert_eq!(codes, vec!["COUPON1", "COUPON2", "COUPON3"]);
        assert!(seed_codes(0).is_empty());
    }
}
