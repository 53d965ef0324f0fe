//! Transport, retry and error mapping.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use market_kit::*;
use serde_json::json;

use crate::mock_node::{MockNode, Reply};

fn fast_retries(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_delay_ms: 1,
        max_delay_ms: 5,
    }
}

#[tokio::test]
async fn test_basic_queries() {
    let node = MockNode::start().await;
    node.result("eth_chainId", json!("0x539"));
    node.result("eth_blockNumber", json!("0x2a"));
    node.result("eth_getBalance", json!("0xde0b6b3a7640000"));

    let eth = node.eth().build();
    assert_eq!(eth.chain_id().await.unwrap(), 1337);
    assert_eq!(eth.chain_id().await.unwrap(), 1337);
    assert_eq!(eth.block_number().await.unwrap(), 42);
    assert_eq!(
        eth.balance(Address::repeat_byte(1)).await.unwrap(),
        parse_wei("1 ether").unwrap()
    );

    // Chain id is cached
    assert_eq!(node.calls("eth_chainId").len(), 1);

    let balance_params = &node.calls("eth_getBalance")[0];
    assert_eq!(balance_params[1], json!("latest"));
}

#[tokio::test]
async fn test_retries_transient_http_errors() {
    let node = MockNode::start().await;
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    node.on("eth_blockNumber", move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Reply::Http(503)
        } else {
            Reply::Result(json!("0x7"))
        }
    });

    let rpc = RpcClient::with_retry_config(node.url(), fast_retries(3));
    assert_eq!(rpc.block_number().await.unwrap(), 7);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_gives_up_after_max_retries() {
    let node = MockNode::start().await;
    node.on("eth_blockNumber", |_| Reply::Http(503));

    let rpc = RpcClient::with_retry_config(node.url(), fast_retries(2));
    let err = rpc.block_number().await.unwrap_err();
    assert!(
        matches!(err, RpcError::Network { status_code: Some(503), .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(node.calls("eth_blockNumber").len(), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let node = MockNode::start().await;
    node.on("eth_blockNumber", |_| Reply::Http(400));

    let rpc = RpcClient::with_retry_config(node.url(), fast_retries(3));
    assert!(rpc.block_number().await.is_err());
    assert_eq!(node.calls("eth_blockNumber").len(), 1);
}

#[tokio::test]
async fn test_unknown_method() {
    let node = MockNode::start().await;
    let rpc = RpcClient::with_retry_config(node.url(), RetryConfig::none());
    let err = rpc.gas_price().await.unwrap_err();
    assert!(matches!(err, RpcError::MethodNotFound(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_missing_receipt_is_none() {
    let node = MockNode::start().await;
    node.result("eth_getTransactionReceipt", json!(null));

    let rpc = RpcClient::new(node.url());
    let receipt = rpc.transaction_receipt(B256::repeat_byte(0xaa)).await.unwrap();
    assert!(receipt.is_none());
}

#[tokio::test]
async fn test_unreachable_node() {
    // Nothing listens on port 1
    let rpc = RpcClient::with_retry_config("http://127.0.0.1:1", RetryConfig::none());
    let err = rpc.block_number().await.unwrap_err();
    assert!(err.is_retryable(), "unexpected error: {err:?}");
}
