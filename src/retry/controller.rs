use crate::config::RetryConfig;
use crate::metrics::{RetryMetrics, Timer};
use crate::retry::delay::{backoff_delay, sleep};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay (1 second)
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default initial delay before the first attempt
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::ZERO;

/// Retry policy with exponential backoff between attempts.
///
/// The operation runs at most `max_retries + 1` times. Before retry `k`
/// (1-indexed) the policy sleeps `base_delay * 2^(k-1)`; `initial_delay` is
/// waited once before the very first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    initial_delay: Duration,
    metrics: Option<RetryMetrics>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            DEFAULT_BASE_DELAY,
            DEFAULT_INITIAL_DELAY,
        )
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::from_millis(
            config.max_retries,
            config.base_delay_ms,
            config.initial_delay_ms,
        )
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            initial_delay,
            metrics: None,
        }
    }

    /// Create a policy from millisecond values
    pub fn from_millis(max_retries: u32, base_delay_ms: u64, initial_delay_ms: u64) -> Self {
        Self::new(
            max_retries,
            Duration::from_millis(base_delay_ms),
            Duration::from_millis(initial_delay_ms),
        )
    }

    /// Attach a metrics collector; every run through this policy is recorded
    #[must_use]
    pub fn with_metrics(mut self, metrics: RetryMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn metrics(&self) -> Option<&RetryMetrics> {
        self.metrics.as_ref()
    }

    /// Total number of times the operation may be invoked
    pub fn max_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }

    /// Delay slept before the retry with the given zero-based index
    pub fn delay_for_retry(&self, retry_index: u32) -> Duration {
        backoff_delay(retry_index, self.base_delay)
    }

    /// Worst-case time spent sleeping when every attempt fails.
    ///
    /// Callers that need a hard deadline can wrap [`RetryPolicy::run`] in a
    /// timeout derived from this value plus the operation's own latency.
    pub fn total_backoff(&self) -> Duration {
        if self.base_delay.is_zero() {
            return self.initial_delay;
        }
        // base * (2^0 + ... + 2^(n-1)) == base * (2^n - 1)
        let retries_total = 1u128
            .checked_shl(self.max_retries)
            .and_then(|power| self.base_delay.as_nanos().checked_mul(power - 1))
            .and_then(duration_from_nanos)
            .unwrap_or(Duration::MAX);
        self.initial_delay.saturating_add(retries_total)
    }

    /// Run `operation` until it succeeds or retries are exhausted.
    ///
    /// On success the value of the successful attempt is returned. After the
    /// last allowed attempt fails, that attempt's error is returned as is;
    /// earlier errors are dropped.
    ///
    /// `E: Display` is only needed to render failures into the `debug!` and
    /// `warn!` events; the error value is never converted or wrapped.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let timer = Timer::start();
        if let Some(metrics) = &self.metrics {
            metrics.record_call();
        }

        if !self.initial_delay.is_zero() {
            self.record_backoff(self.initial_delay);
            sleep(self.initial_delay).await;
        }

        let mut attempt: u64 = 0;
        loop {
            if let Some(metrics) = &self.metrics {
                metrics.record_attempt(attempt > 0);
            }
            attempt += 1;

            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            attempt,
                            elapsed_ms = timer.elapsed().as_millis() as u64,
                            "Operation succeeded after retry"
                        );
                    }
                    self.record_outcome(true);
                    return Ok(value);
                }
                Err(error) => {
                    if attempt > u64::from(self.max_retries) {
                        warn!(
                            attempts = attempt,
                            elapsed_ms = timer.elapsed().as_millis() as u64,
                            %error,
                            "Operation failed, retries exhausted"
                        );
                        self.record_outcome(false);
                        return Err(error);
                    }

                    let retry_index = u32::try_from(attempt - 1).unwrap_or(u32::MAX);
                    let delay = self.delay_for_retry(retry_index);
                    debug!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "Operation failed, retrying"
                    );
                    self.record_backoff(delay);
                    sleep(delay).await;
                }
            }
        }
    }

    fn record_backoff(&self, delay: Duration) {
        if let Some(metrics) = &self.metrics {
            metrics.record_backoff(delay);
        }
    }

    fn record_outcome(&self, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(success);
        }
    }
}

fn duration_from_nanos(nanos: u128) -> Option<Duration> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}

/// Retry a fallible async operation with exponential backoff.
///
/// Equivalent to `RetryPolicy::new(max_retries, base_delay, initial_delay).run(operation)`.
/// The `E: Display` bound exists only so failed attempts can be logged at
/// `debug` and exhaustion at `warn`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use chain_backoff::retry::retry_with_backoff;
///
/// # tokio_test::block_on(async {
/// let mut calls = 0;
/// let result: Result<u32, String> = retry_with_backoff(
///     || {
///         calls += 1;
///         let outcome = if calls < 3 { Err(format!("flaky {calls}")) } else { Ok(calls) };
///         async move { outcome }
///     },
///     3,
///     Duration::from_millis(1),
///     Duration::ZERO,
/// )
/// .await;
/// assert_eq!(result, Ok(3));
/// # });
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation: F,
    max_retries: u32,
    base_delay: Duration,
    initial_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetryPolicy::new(max_retries, base_delay, initial_delay)
        .run(operation)
        .await
}
