use crate::error::WalletError;
use alloy_primitives::{Address, Bytes, TxHash, U256};

/// Transaction submission capability provided by the host application.
///
/// Signing, nonce management and receipt polling live behind this trait.
#[async_trait::async_trait]
pub trait Wallet: Send + Sync {
    /// Sign and broadcast a transaction, returning its hash
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, WalletError>;

    /// Wait until the transaction is mined and return its receipt
    async fn wait_for_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<TransactionReceipt, WalletError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl TransactionRequest {
    /// Contract call carrying no ether
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            data,
            value: U256::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    /// `true` when execution succeeded, `false` when it reverted
    pub status: bool,
}
