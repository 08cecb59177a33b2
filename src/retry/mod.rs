pub mod controller;
pub mod delay;

pub use controller::{
    DEFAULT_BASE_DELAY, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy, retry_with_backoff,
};
pub use delay::{backoff_delay, sleep};
