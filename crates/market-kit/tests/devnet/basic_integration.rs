use std::time::Duration;

use futures::StreamExt;
use market_kit::*;

use crate::common::devnet;

#[tokio::test]
async fn test_connect_and_chain_state() {
    let eth = devnet();
    let account = eth.connect().await.unwrap();

    assert!(eth.chain_id().await.unwrap() > 0);
    assert!(eth.balance(account).await.unwrap() > U256::ZERO);
    let _ = eth.block_number().await.unwrap();
}

#[tokio::test]
async fn test_watch_accounts_selects_first() {
    let eth = devnet();
    let accounts = eth.rpc().accounts().await.unwrap();

    let mut changes = eth.watch_accounts(Duration::from_millis(100));
    let first = changes.next().await.unwrap().unwrap();
    assert_eq!(first, accounts.first().copied());
    assert_eq!(eth.account(), first);
}
