//! Retry with exponential backoff for flaky async calls, plus the gas and
//! token approval helpers built around it.

pub mod approval;
pub mod config;
pub mod error;
pub mod gas;
pub mod logging;
pub mod metrics;
pub mod retry;
pub mod wallet;

// Re-export commonly used types for convenience
pub use alloy_primitives::{Address, Bytes, TxHash, U256};
pub use approval::{ApprovalOutcome, ApprovalReceipt, approve_spend, approve_spend_with_retry};
pub use config::{AppConfig, GasConfig, LoggingConfig, RetryConfig};
pub use error::{ApprovalError, ChainBackoffError, ChainBackoffResult, GasError, WalletError};
pub use gas::scale_gas;
pub use metrics::{RetryMetrics, RetryMetricsSnapshot};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use wallet::{TransactionReceipt, TransactionRequest, Wallet};
