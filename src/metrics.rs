//! Retry metrics and timing

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Metrics collector shared by every policy it is attached to
#[derive(Clone, Debug)]
pub struct RetryMetrics {
    /// Number of controller invocations
    pub calls: Arc<AtomicU64>,
    /// Number of operation invocations, first attempts included
    pub attempts: Arc<AtomicU64>,
    /// Number of attempts after the first
    pub retries: Arc<AtomicU64>,
    /// Number of calls that ended with a successful attempt
    pub successes: Arc<AtomicU64>,
    /// Number of calls that ran out of retries
    pub exhaustions: Arc<AtomicU64>,
    /// Total time scheduled for sleeping, in microseconds
    pub backoff_time_us: Arc<AtomicU64>,
}

impl Default for RetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicU64::new(0)),
            attempts: Arc::new(AtomicU64::new(0)),
            retries: Arc::new(AtomicU64::new(0)),
            successes: Arc::new(AtomicU64::new(0)),
            exhaustions: Arc::new(AtomicU64::new(0)),
            backoff_time_us: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one invocation of the wrapped operation
    pub fn record_attempt(&self, is_retry: bool) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if is_retry {
            self.retries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a scheduled sleep
    pub fn record_backoff(&self, delay: Duration) {
        let micros = u64::try_from(delay.as_micros()).unwrap_or(u64::MAX);
        let total = &self.backoff_time_us;
        // fetch_update never fails with a closure returning Some
        let _ = total.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
            Some(current.saturating_add(micros))
        });
    }

    /// Record how a call ended
    pub fn record_outcome(&self, success: bool) {
        if success {
            self.successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.exhaustions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> RetryMetricsSnapshot {
        let calls = self.calls.load(Ordering::Relaxed);
        let attempts = self.attempts.load(Ordering::Relaxed);
        let successes = self.successes.load(Ordering::Relaxed);
        let exhaustions = self.exhaustions.load(Ordering::Relaxed);
        let finished = successes + exhaustions;

        RetryMetricsSnapshot {
            calls,
            attempts,
            retries: self.retries.load(Ordering::Relaxed),
            successes,
            exhaustions,
            total_backoff_ms: self.backoff_time_us.load(Ordering::Relaxed) as f64 / 1000.0,
            average_attempts_per_call: if calls > 0 {
                attempts as f64 / calls as f64
            } else {
                0.0
            },
            success_rate: if finished > 0 {
                (successes as f64 / finished as f64) * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct RetryMetricsSnapshot {
    pub calls: u64,
    pub attempts: u64,
    pub retries: u64,
    pub successes: u64,
    pub exhaustions: u64,
    pub total_backoff_ms: f64,
    pub average_attempts_per_call: f64,
    pub success_rate: f64,
}

impl RetryMetricsSnapshot {
    /// Render the snapshot as a JSON value for status reporting
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Helper for timing operations on the tokio clock
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
