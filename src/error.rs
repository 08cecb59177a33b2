//! Error types for chain-backoff

use alloy_primitives::TxHash;
use thiserror::Error;

/// Main error type for chain-backoff operations
#[derive(Error, Debug)]
pub enum ChainBackoffError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gas scaling errors
    #[error("Gas scaling failed: {0}")]
    Gas(#[from] GasError),

    /// Wallet capability errors
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Token approval errors
    #[error("Approval error: {0}")]
    Approval(#[from] ApprovalError),
}

/// Gas multiplier errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GasError {
    /// Multiplier is negative, NaN or infinite
    #[error("Invalid gas multiplier: {multiplier} (must be finite and non-negative)")]
    InvalidMultiplier { multiplier: f64 },

    /// Scaled value does not fit in 256 bits
    #[error("Scaled gas overflows 256 bits: {gas} * {multiplier}")]
    Overflow { gas: String, multiplier: f64 },
}

/// Errors reported by a wallet implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Transport or node failure
    #[error("RPC request failed: {0}")]
    Rpc(String),

    /// The node or signer refused the transaction
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// No receipt could be obtained for a submitted transaction
    #[error("Receipt unavailable for transaction {hash}")]
    ReceiptUnavailable { hash: TxHash },
}

/// Token approval errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    /// Submitting the approve transaction failed
    #[error("failed to submit approve transaction: {0}")]
    Submission(#[source] WalletError),

    /// The transaction was sent but confirmation failed
    #[error("failed to confirm approve transaction {hash}: {source}")]
    Confirmation { hash: TxHash, source: WalletError },

    /// The transaction was mined but reverted
    #[error("approve transaction {hash} reverted")]
    Reverted { hash: TxHash },
}

impl ApprovalError {
    /// Hash of the submitted transaction, if submission got that far
    pub fn transaction_hash(&self) -> Option<TxHash> {
        match self {
            Self::Submission(_) => None,
            Self::Confirmation { hash, .. } | Self::Reverted { hash } => Some(*hash),
        }
    }
}

/// Result type alias for convenience
pub type ChainBackoffResult<T> = Result<T, ChainBackoffError>;
