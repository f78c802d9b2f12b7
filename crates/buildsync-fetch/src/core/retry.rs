use std::time::Duration;

/// Delay before retry number `retry` (0 = first retry): `base * 2^retry`, capped at `cap`.
///
/// A zero `base` disables backoff entirely.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use buildsync_fetch::backoff_delay;
///
/// let base = Duration::from_millis(100);
/// let cap = Duration::from_secs(1);
///
/// assert_eq!(backoff_delay(0, base, cap), Duration::from_millis(100));
/// assert_eq!(backoff_delay(2, base, cap), Duration::from_millis(400));
/// assert_eq!(backoff_delay(9, base, cap), cap);
/// ```
pub fn backoff_delay(retry: u32, base: Duration, cap: Duration) -> Duration {
    let multiplier = 2_u32.saturating_pow(retry);
    base.saturating_mul(multiplier).min(cap)
}
