//! Account resolution and switching.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use market_kit::*;
use serde_json::json;

use crate::mock_node::{MockNode, Reply};

#[tokio::test]
async fn test_connect_picks_first_node_account() {
    let node = MockNode::start().await;
    node.accounts(&[Address::repeat_byte(1), Address::repeat_byte(2)]);

    let eth = node.eth().build();
    assert_eq!(eth.connect().await.unwrap(), Address::repeat_byte(1));
    assert_eq!(eth.account(), Some(Address::repeat_byte(1)));
}

#[tokio::test]
async fn test_connect_without_accounts() {
    let node = MockNode::start().await;
    node.accounts(&[]);

    let eth = node.eth().build();
    assert!(matches!(eth.connect().await, Err(Error::NoAccount)));
}

#[tokio::test]
async fn test_connect_prefers_signer() {
    let node = MockNode::start().await;
    let signer = LocalSigner::random();
    let expected = signer.address();

    let eth = node.eth().signer(signer).build();
    assert_eq!(eth.connect().await.unwrap(), expected);
    assert!(node.calls("eth_accounts").is_empty());
}

#[tokio::test]
async fn test_watch_accounts_follows_node() {
    let node = MockNode::start().await;
    let responses = Arc::new(Mutex::new(vec![
        json!([Address::repeat_byte(1)]),
        json!([Address::repeat_byte(1)]),
        json!([Address::repeat_byte(2), Address::repeat_byte(1)]),
        json!([]),
    ]));
    node.on("eth_accounts", move |_| {
        let mut lists = responses.lock().unwrap();
        let next = if lists.len() > 1 {
            lists.remove(0)
        } else {
            lists[0].clone()
        };
        Reply::Result(next)
    });

    let eth = node.eth().build();
    let nft = eth.nft(Address::repeat_byte(0xc0)).unwrap();
    let mut changes = eth.watch_accounts(Duration::from_millis(5));

    assert_eq!(changes.next().await.unwrap().unwrap(), Some(Address::repeat_byte(1)));
    // Unchanged polls are not yielded
    assert_eq!(changes.next().await.unwrap().unwrap(), Some(Address::repeat_byte(2)));
    assert_eq!(eth.account(), Some(Address::repeat_byte(2)));

    assert_eq!(changes.next().await.unwrap().unwrap(), None);
    assert_eq!(eth.account(), None);

    // Facades see the cleared selection
    assert!(matches!(nft.burn(1u64).await, Err(Error::NoAccount)));
}

#[tokio::test]
async fn test_watch_accounts_yields_poll_errors() {
    let node = MockNode::start().await;
    node.error("eth_accounts", -32603, "internal error", None);

    let eth = node.eth().build();
    let mut changes = eth.watch_accounts(Duration::from_millis(5));
    let err = changes.next().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Rpc(RpcError::InternalError(_))), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_selection_changes_are_observable() {
    let node = MockNode::start().await;
    let eth = node.eth().build();
    let mut changes = Box::pin(eth.accounts().subscribe());

    eth.select_account(Address::repeat_byte(4));
    assert_eq!(changes.next().await, Some(Some(Address::repeat_byte(4))));
}

#[tokio::test]
async fn test_watch_accounts_keeps_signer_selected() {
    let node = MockNode::start().await;
    node.accounts(&[]);
    let signer = LocalSigner::random();
    let expected = signer.address();

    let eth = node.eth().signer(signer).build();
    eth.accounts().clear();
    let mut changes = eth.watch_accounts(Duration::from_millis(5));

    assert_eq!(changes.next().await.unwrap().unwrap(), Some(expected));
    assert_eq!(eth.account(), Some(expected));

    // An empty node account list never clears the signer
    let next = tokio::time::timeout(Duration::from_millis(50), changes.next()).await;
    assert!(next.is_err(), "unexpected change: {next:?}");
    assert_eq!(eth.account(), Some(expected));
    assert!(node.calls("eth_accounts").is_empty());
}
