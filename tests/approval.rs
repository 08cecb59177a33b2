use alloy_primitives::{Address, B256, TxHash, U256, address};
use chain_backoff::approval::{
    ApprovalOutcome, approve_spend, approve_spend_message, approve_spend_with_retry,
    encode_approve_call,
};
use chain_backoff::error::{ApprovalError, ChainBackoffError, WalletError};
use chain_backoff::retry::RetryPolicy;
use chain_backoff::wallet::{TransactionReceipt, TransactionRequest, Wallet};
use std::collections::VecDeque;
use std::sync::Mutex;

const TOKEN: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
const SPENDER: Address = address!("7a250d5630b4cf539739df2c5dacb4c659f2488d");

fn tx_hash() -> TxHash {
    B256::repeat_byte(0xab)
}

/// Scripted wallet: returns queued results and records every call
#[derive(Default)]
struct MockWallet {
    send_results: Mutex<VecDeque<Result<TxHash, WalletError>>>,
    wait_results: Mutex<VecDeque<Result<TransactionReceipt, WalletError>>>,
    sent: Mutex<Vec<TransactionRequest>>,
    waited: Mutex<Vec<TxHash>>,
}

impl MockWallet {
    fn new() -> Self {
        Self::default()
    }

    fn on_send(self, result: Result<TxHash, WalletError>) -> Self {
        self.send_results.lock().unwrap().push_back(result);
        self
    }

    fn on_wait(self, result: Result<TransactionReceipt, WalletError>) -> Self {
        self.wait_results.lock().unwrap().push_back(result);
        self
    }

    fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn waited(&self) -> Vec<TxHash> {
        self.waited.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Wallet for MockWallet {
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, WalletError> {
        self.sent.lock().unwrap().push(request);
        self.send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WalletError::Rpc("no scripted send result".to_string())))
    }

    async fn wait_for_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<TransactionReceipt, WalletError> {
        self.waited.lock().unwrap().push(hash);
        self.wait_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WalletError::ReceiptUnavailable { hash }))
    }
}

fn mined(hash: TxHash, status: bool) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: hash,
        block_number: Some(19_000_000),
        status,
    }
}

#[test]
fn test_encode_approve_call() {
    let amount = U256::from(1_000_000u64);
    let data = encode_approve_call(SPENDER, amount);

    assert_eq!(data.len(), 4 + 32 + 32);
    // keccak256("approve(address,uint256)")[..4]
    assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
    assert_eq!(&data[4..16], &[0u8; 12]);
    assert_eq!(&data[16..36], SPENDER.as_slice());
    assert_eq!(&data[36..68], &amount.to_be_bytes::<32>());
}

#[tokio::test]
async fn test_approve_spend_success() {
    let wallet = MockWallet::new()
        .on_send(Ok(tx_hash()))
        .on_wait(Ok(mined(tx_hash(), true)));
    let amount = U256::from(500u64);

    let outcome = approve_spend(&wallet, TOKEN, SPENDER, amount).await;

    assert!(outcome.is_approved());
    let receipt = outcome.receipt().unwrap();
    assert_eq!(receipt.token, TOKEN);
    assert_eq!(receipt.spender, SPENDER);
    assert_eq!(receipt.amount, amount);
    assert_eq!(receipt.transaction_hash, tx_hash());
    assert_eq!(receipt.block_number, Some(19_000_000));

    let message = outcome.to_string();
    assert!(message.contains(&SPENDER.to_string()));
    assert!(message.contains("500"));
    assert_eq!(
        message,
        format!("Successfully approved {} to spend 500 tokens", SPENDER)
    );
}

#[tokio::test]
async fn test_approve_spend_waits_on_returned_hash() {
    let hash = B256::repeat_byte(0x42);
    let wallet = MockWallet::new()
        .on_send(Ok(hash))
        .on_wait(Ok(mined(hash, true)));

    let _ = approve_spend(&wallet, TOKEN, SPENDER, U256::from(1u64)).await;

    assert_eq!(wallet.waited(), vec![hash]);
}

#[tokio::test]
async fn test_approve_spend_sends_approve_call_to_token() {
    let amount = U256::from(10u64).pow(U256::from(18u64));
    let wallet = MockWallet::new()
        .on_send(Ok(tx_hash()))
        .on_wait(Ok(mined(tx_hash(), true)));

    let _ = approve_spend(&wallet, TOKEN, SPENDER, amount).await;

    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, TOKEN);
    assert_eq!(sent[0].value, U256::ZERO);
    assert_eq!(sent[0].data, encode_approve_call(SPENDER, amount));
}

#[tokio::test]
async fn test_approve_spend_submission_failure() {
    let wallet = MockWallet::new().on_send(Err(WalletError::Rejected(
        "insufficient funds for gas".to_string(),
    )));

    let outcome = approve_spend(&wallet, TOKEN, SPENDER, U256::from(500u64)).await;

    assert!(!outcome.is_approved());
    assert!(matches!(
        outcome.error(),
        Some(ApprovalError::Submission(WalletError::Rejected(_)))
    ));
    let message = outcome.to_string();
    assert!(message.starts_with("Error approving tokens:"));
    assert!(message.contains("insufficient funds for gas"));
    // Nothing to wait for
    assert!(wallet.waited().is_empty());
}

#[tokio::test]
async fn test_approve_spend_confirmation_failure() {
    let wallet = MockWallet::new()
        .on_send(Ok(tx_hash()))
        .on_wait(Err(WalletError::Rpc("connection reset".to_string())));

    let outcome = approve_spend(&wallet, TOKEN, SPENDER, U256::from(7u64)).await;

    match outcome.error() {
        Some(ApprovalError::Confirmation { hash, source }) => {
            assert_eq!(*hash, tx_hash());
            assert_eq!(*source, WalletError::Rpc("connection reset".to_string()));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(outcome.to_string().contains("connection reset"));
    assert_eq!(outcome.error().unwrap().transaction_hash(), Some(tx_hash()));
}

#[tokio::test]
async fn test_approve_spend_reverted() {
    let wallet = MockWallet::new()
        .on_send(Ok(tx_hash()))
        .on_wait(Ok(mined(tx_hash(), false)));

    let outcome = approve_spend(&wallet, TOKEN, SPENDER, U256::from(7u64)).await;

    assert_eq!(
        outcome,
        ApprovalOutcome::Failed(ApprovalError::Reverted { hash: tx_hash() })
    );
    assert!(outcome.to_string().contains("reverted"));
}

#[tokio::test]
async fn test_approve_spend_message() {
    let wallet = MockWallet::new().on_send(Err(WalletError::Rpc("node offline".to_string())));

    let message = approve_spend_message(&wallet, TOKEN, SPENDER, U256::from(1u64)).await;

    assert!(message.contains("node offline"));
}

#[tokio::test]
async fn test_approve_spend_through_trait_object() {
    let wallet: Box<dyn Wallet> = Box::new(
        MockWallet::new()
            .on_send(Ok(tx_hash()))
            .on_wait(Ok(mined(tx_hash(), true))),
    );

    let outcome = approve_spend(wallet.as_ref(), TOKEN, SPENDER, U256::from(3u64)).await;

    assert!(outcome.is_approved());
}

#[tokio::test]
async fn test_into_result_propagates_as_crate_error() {
    async fn approve(wallet: &MockWallet) -> Result<TxHash, ChainBackoffError> {
        let receipt = approve_spend(wallet, TOKEN, SPENDER, U256::from(1u64))
            .await
            .into_result()?;
        Ok(receipt.transaction_hash)
    }

    let ok_wallet = MockWallet::new()
        .on_send(Ok(tx_hash()))
        .on_wait(Ok(mined(tx_hash(), true)));
    assert_eq!(approve(&ok_wallet).await.unwrap(), tx_hash());

    let failing_wallet = MockWallet::new().on_send(Err(WalletError::Rpc("down".to_string())));
    let error = approve(&failing_wallet).await.unwrap_err();
    assert!(matches!(error, ChainBackoffError::Approval(_)));
}

#[tokio::test(start_paused = true)]
async fn test_approve_spend_with_retry_recovers_receipt() {
    let wallet = MockWallet::new()
        .on_send(Ok(tx_hash()))
        .on_wait(Err(WalletError::ReceiptUnavailable { hash: tx_hash() }))
        .on_wait(Err(WalletError::Rpc("timeout".to_string())))
        .on_wait(Ok(mined(tx_hash(), true)));
    let policy = RetryPolicy::from_millis(3, 100, 0);

    let outcome =
        approve_spend_with_retry(&wallet, TOKEN, SPENDER, U256::from(9u64), &policy).await;

    assert!(outcome.is_approved());
    assert_eq!(wallet.sent().len(), 1);
    assert_eq!(wallet.waited(), vec![tx_hash(); 3]);
}

#[tokio::test(start_paused = true)]
async fn test_approve_spend_with_retry_exhausted() {
    let wallet = MockWallet::new().on_send(Ok(tx_hash()));
    let policy = RetryPolicy::from_millis(2, 100, 0);

    let outcome =
        approve_spend_with_retry(&wallet, TOKEN, SPENDER, U256::from(9u64), &policy).await;

    assert_eq!(
        outcome,
        ApprovalOutcome::Failed(ApprovalError::Confirmation {
            hash: tx_hash(),
            source: WalletError::ReceiptUnavailable { hash: tx_hash() },
        })
    );
    assert_eq!(wallet.waited().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_approve_spend_with_retry_never_resubmits() {
    let wallet = MockWallet::new().on_send(Err(WalletError::Rpc("timeout".to_string())));
    let policy = RetryPolicy::from_millis(5, 100, 0);

    let outcome =
        approve_spend_with_retry(&wallet, TOKEN, SPENDER, U256::from(9u64), &policy).await;

    assert!(matches!(
        outcome,
        ApprovalOutcome::Failed(ApprovalError::Submission(_))
    ));
    assert_eq!(wallet.sent().len(), 1);
    assert!(wallet.waited().is_empty());
}

#[test]
fn test_outcome_accessors() {
    let failed = ApprovalOutcome::Failed(ApprovalError::Reverted { hash: tx_hash() });
    assert!(failed.receipt().is_none());
    assert!(failed.error().is_some());
    assert_eq!(
        failed.clone().into_result().unwrap_err().transaction_hash(),
        Some(tx_hash())
    );
}
