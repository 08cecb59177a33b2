//! Delay scheduling for retry loops
//!
//! Computes exponential backoff durations and suspends the current task
//! between attempts.

use std::time::Duration;

/// Calculate the exponential backoff delay before a retry.
///
/// # Arguments
///
/// * `retry_index` - Zero-based index of the retry about to run (0 for the first retry)
/// * `base` - Delay used for the first retry
///
/// # Returns
///
/// `base * 2^retry_index`, saturating at [`Duration::MAX`]. A zero base always
/// yields a zero delay.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use chain_backoff::retry::backoff_delay;
///
/// let base = Duration::from_millis(100);
/// assert_eq!(backoff_delay(0, base), Duration::from_millis(100));
/// assert_eq!(backoff_delay(1, base), Duration::from_millis(200));
/// assert_eq!(backoff_delay(3, base), Duration::from_millis(800));
/// ```
pub fn backoff_delay(retry_index: u32, base: Duration) -> Duration {
    if base.is_zero() {
        return Duration::ZERO;
    }
    2u32.checked_pow(retry_index)
        .and_then(|factor| base.checked_mul(factor))
        .unwrap_or(Duration::MAX)
}

/// Suspend the current task for at least `duration`.
///
/// Other tasks keep running while this one sleeps. A zero duration still
/// yields to the scheduler once before resuming.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(duration).await;
    }
}
