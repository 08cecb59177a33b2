//! ERC-20 spend approvals
//!
//! [`approve_spend`] never fails: every wallet error is captured in
//! [`ApprovalOutcome::Failed`]. The `Display` impl on the outcome renders the
//! human-readable status line.

use crate::error::{ApprovalError, WalletError};
use crate::retry::RetryPolicy;
use crate::wallet::{TransactionReceipt, TransactionRequest, Wallet};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::{SolCall, sol};
use std::fmt;
use tracing::{debug, info, warn};

sol! {
    function approve(address spender, uint256 amount) external returns (bool);
}

/// Confirmation data for a successful approval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalReceipt {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Result of an approval attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved(ApprovalReceipt),
    Failed(ApprovalError),
}

impl ApprovalOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }

    pub fn receipt(&self) -> Option<&ApprovalReceipt> {
        match self {
            Self::Approved(receipt) => Some(receipt),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ApprovalError> {
        match self {
            Self::Approved(_) => None,
            Self::Failed(error) => Some(error),
        }
    }

    /// Convert into a `Result` for callers that want `?` propagation
    pub fn into_result(self) -> Result<ApprovalReceipt, ApprovalError> {
        match self {
            Self::Approved(receipt) => Ok(receipt),
            Self::Failed(error) => Err(error),
        }
    }
}

impl fmt::Display for ApprovalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved(receipt) => write!(
                f,
                "Successfully approved {} to spend {} tokens",
                receipt.spender, receipt.amount
            ),
            Self::Failed(error) => write!(f, "Error approving tokens: {}", error),
        }
    }
}

/// ABI-encode `approve(spender, amount)` calldata
pub fn encode_approve_call(spender: Address, amount: U256) -> Bytes {
    Bytes::from(approveCall { spender, amount }.abi_encode())
}

/// Approve `spender` to transfer `amount` of `token` on behalf of the wallet.
///
/// Submits the approve call, waits for its receipt and reports the outcome.
pub async fn approve_spend<W>(
    wallet: &W,
    token: Address,
    spender: Address,
    amount: U256,
) -> ApprovalOutcome
where
    W: Wallet + ?Sized,
{
    let hash = match submit_approval(wallet, token, spender, amount).await {
        Ok(hash) => hash,
        Err(error) => return ApprovalOutcome::Failed(error),
    };

    let receipt = wallet.wait_for_transaction_receipt(hash).await;
    finish_approval(token, spender, amount, hash, receipt)
}

/// Same as [`approve_spend`], but the receipt wait is retried per `policy`.
///
/// The submission itself is attempted once so a flaky node cannot cause a
/// duplicate approve transaction.
pub async fn approve_spend_with_retry<W>(
    wallet: &W,
    token: Address,
    spender: Address,
    amount: U256,
    policy: &RetryPolicy,
) -> ApprovalOutcome
where
    W: Wallet + ?Sized,
{
    let hash = match submit_approval(wallet, token, spender, amount).await {
        Ok(hash) => hash,
        Err(error) => return ApprovalOutcome::Failed(error),
    };

    let receipt = policy
        .run(move || wallet.wait_for_transaction_receipt(hash))
        .await;
    finish_approval(token, spender, amount, hash, receipt)
}

/// Convenience wrapper returning only the rendered status line
pub async fn approve_spend_message<W>(
    wallet: &W,
    token: Address,
    spender: Address,
    amount: U256,
) -> String
where
    W: Wallet + ?Sized,
{
    approve_spend(wallet, token, spender, amount)
        .await
        .to_string()
}

async fn submit_approval<W>(
    wallet: &W,
    token: Address,
    spender: Address,
    amount: U256,
) -> Result<TxHash, ApprovalError>
where
    W: Wallet + ?Sized,
{
    let request = TransactionRequest::call(token, encode_approve_call(spender, amount));
    debug!(%token, %spender, %amount, "Submitting approve transaction");

    wallet.send_transaction(request).await.map_err(|e| {
        warn!(%token, %spender, error = %e, "Approve submission failed");
        ApprovalError::Submission(e)
    })
}

fn finish_approval(
    token: Address,
    spender: Address,
    amount: U256,
    hash: TxHash,
    receipt: Result<TransactionReceipt, WalletError>,
) -> ApprovalOutcome {
    match receipt {
        Ok(receipt) if receipt.status => {
            info!(%token, %spender, %amount, %hash, "Approval confirmed");
            ApprovalOutcome::Approved(ApprovalReceipt {
                token,
                spender,
                amount,
                transaction_hash: hash,
                block_number: receipt.block_number,
            })
        }
        Ok(_) => {
            warn!(%token, %spender, %hash, "Approve transaction reverted");
            ApprovalOutcome::Failed(ApprovalError::Reverted { hash })
        }
        Err(source) => {
            warn!(%token, %spender, %hash, error = %source, "Approve confirmation failed");
            ApprovalOutcome::Failed(ApprovalError::Confirmation { hash, source })
        }
    }
}
