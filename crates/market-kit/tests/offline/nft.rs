//! Tomosia NFT facade.

use alloy_sol_types::{SolCall, SolValue};
use market_kit::abi::TomosiaNFT;
use market_kit::*;
use serde_json::json;

use crate::mock_node::{MockNode, TX_HASH, address, hex_bytes};

fn collection() -> Address {
    Address::repeat_byte(0xc0)
}

fn owner() -> Address {
    Address::repeat_byte(0x0a)
}

/// Answers the collection's read methods.
fn serve_collection(node: &MockNode) {
    node.contract(|data| {
        let selector: [u8; 4] = data[..4].try_into().unwrap();
        match selector {
            TomosiaNFT::ownerCall::SELECTOR => owner().abi_encode(),
            TomosiaNFT::pausedCall::SELECTOR => false.abi_encode(),
            TomosiaNFT::balanceOfCall::SELECTOR => U256::from(3).abi_encode(),
            TomosiaNFT::ownerOfCall::SELECTOR => Address::repeat_byte(0xb0).abi_encode(),
            TomosiaNFT::isApprovedForAllCall::SELECTOR => true.abi_encode(),
            TomosiaNFT::ownerTokenIdsCall::SELECTOR => {
                (vec![U256::from(1), U256::from(4), U256::from(9)],).abi_encode_params()
            }
            TomosiaNFT::tokenURICall::SELECTOR => {
                let call = TomosiaNFT::tokenURICall::abi_decode(data, true).unwrap();
                (format!("ipfs://tomosia/{}", call.tokenId),).abi_encode_params()
            }
            other => panic!("unexpected selector {}", hex::encode(other)),
        }
    });
}

#[tokio::test]
async fn test_reads() {
    let node = MockNode::start().await;
    serve_collection(&node);

    let eth = node.eth().build();
    let nft = eth.nft(collection()).unwrap();

    assert_eq!(nft.owner().await.unwrap(), owner());
    assert!(!nft.paused().await.unwrap());
    assert_eq!(nft.balance_of(owner()).await.unwrap(), U256::from(3));
    assert_eq!(nft.owner_of(4u64).await.unwrap(), Address::repeat_byte(0xb0));
    assert!(nft.is_approved_for_all(owner(), Address::ZERO).await.unwrap());
    assert_eq!(
        nft.owner_token_ids(owner()).await.unwrap(),
        vec![U256::from(1), U256::from(4), U256::from(9)]
    );
    assert_eq!(nft.token_uri(9u64).await.unwrap(), "ipfs://tomosia/9");

    // Reads go to the collection and need no account
    for params in node.calls("eth_call") {
        assert_eq!(address(&params[0]["to"]), collection());
        assert!(params[0].get("from").is_none());
    }
}

#[tokio::test]
async fn test_undecodable_return_data() {
    let node = MockNode::start().await;
    node.contract(|_| Vec::new());

    let eth = node.eth().build();
    let err = eth.nft(collection()).unwrap().owner().await.unwrap_err();
    assert!(
        matches!(err, Error::Abi { method: "owner()", .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_connect_caches_owner_and_selects_account() {
    let node = MockNode::start().await;
    serve_collection(&node);
    node.accounts(&[Address::repeat_byte(0x11)]);

    let eth = node.eth().build();
    let nft = eth.nft(collection()).unwrap();

    assert_eq!(nft.connect().await.unwrap(), owner());
    assert_eq!(eth.account(), Some(Address::repeat_byte(0x11)));

    assert_eq!(nft.cached_owner().await.unwrap(), owner());
    assert_eq!(node.calls("eth_call").len(), 1);
}

#[tokio::test]
async fn test_connect_without_accounts_is_read_only() {
    let node = MockNode::start().await;
    serve_collection(&node);
    node.accounts(&[]);

    let eth = node.eth().build();
    let nft = eth.nft(collection()).unwrap();
    assert_eq!(nft.connect().await.unwrap(), owner());
    assert_eq!(eth.account(), None);

    let err = nft.burn(1u64).await.unwrap_err();
    assert!(matches!(err, Error::NoAccount));
    assert!(node.calls("eth_sendTransaction").is_empty());
}

#[tokio::test]
async fn test_reconnect_picks_up_new_owner() {
    let node = MockNode::start().await;
    node.mine(1, None);
    let new_owner = Address::repeat_byte(0x0b);
    let mut lookups = 0;
    node.contract(move |data| {
        assert_eq!(&data[..4], &TomosiaNFT::ownerCall::SELECTOR[..]);
        lookups += 1;
        // Ownership is transferred after the first lookup
        let current = if lookups == 1 { owner() } else { new_owner };
        current.abi_encode()
    });

    let eth = node.eth().account(Address::repeat_byte(0x11)).build();
    let nft = eth.nft(collection()).unwrap();

    assert_eq!(nft.connect().await.unwrap(), owner());
    nft.mint_nft("ipfs://tomosia/1").await.unwrap();

    assert_eq!(nft.connect().await.unwrap(), new_owner);
    assert_eq!(nft.cached_owner().await.unwrap(), new_owner);
    nft.mint_nft("ipfs://tomosia/2").await.unwrap();

    let senders: Vec<Address> = node
        .calls("eth_sendTransaction")
        .iter()
        .map(|p| address(&p[0]["from"]))
        .collect();
    assert_eq!(senders, vec![owner(), new_owner]);
}

#[tokio::test]
async fn test_mint_is_sent_from_owner() {
    let node = MockNode::start().await;
    serve_collection(&node);
    node.mine(1, None);

    let eth = node.eth().account(Address::repeat_byte(0x11)).build();
    let nft = eth.nft(collection()).unwrap();

    let receipt = nft.mint_nft("ipfs://tomosia/1").await.unwrap();
    assert_eq!(receipt.transaction_hash.to_string(), TX_HASH);
    assert_eq!(receipt.block(), Some(16));

    let sent = node.calls("eth_sendTransaction");
    assert_eq!(sent.len(), 1);
    let tx = &sent[0][0];
    assert_eq!(address(&tx["from"]), owner());
    assert_eq!(address(&tx["to"]), collection());
    assert!(tx.get("value").is_none());
    assert_eq!(
        hex_bytes(&tx["data"]),
        TomosiaNFT::mintNftCall {
            tokenURI: "ipfs://tomosia/1".into()
        }
        .abi_encode()
    );
}

#[tokio::test]
async fn test_batch_mint_and_base_uri() {
    let node = MockNode::start().await;
    serve_collection(&node);
    node.mine(1, None);

    let eth = node.eth().build();
    let nft = eth.nft(collection()).unwrap();

    nft.mint_nfts(["a", "b"]).await.unwrap();
    nft.set_base_uri("ipfs://base/").await.unwrap();

    let sent = node.calls("eth_sendTransaction");
    assert_eq!(
        hex_bytes(&sent[0][0]["data"]),
        TomosiaNFT::mintNftsCall {
            tokenURIs: vec!["a".into(), "b".into()]
        }
        .abi_encode()
    );
    assert_eq!(
        &hex_bytes(&sent[1][0]["data"])[..4],
        &TomosiaNFT::setBaseURICall::SELECTOR[..]
    );
    assert!(sent.iter().all(|p| address(&p[0]["from"]) == owner()));

    // Owner looked up once for both writes
    assert_eq!(node.calls("eth_call").len(), 1);
}

#[tokio::test]
async fn test_transfers_follow_selected_account() {
    let node = MockNode::start().await;
    node.mine(1, None);

    let alice = Address::repeat_byte(0xa1);
    let bob = Address::repeat_byte(0xb0);

    let eth = node.eth().account(alice).build();
    let nft = eth.nft(collection()).unwrap();

    nft.transfer_from(alice, bob, 1u64).await.unwrap();

    // Switching on the client applies to the existing facade
    eth.select_account(bob);
    nft.safe_transfer_from(bob, alice, 1u64).await.unwrap();
    nft.burn(2u64).from(alice).await.unwrap();

    let senders: Vec<Address> = node
        .calls("eth_sendTransaction")
        .iter()
        .map(|p| address(&p[0]["from"]))
        .collect();
    assert_eq!(senders, vec![alice, bob, alice]);
}

#[tokio::test]
async fn test_reverted_receipt() {
    let node = MockNode::start().await;
    node.mine(0, None);

    let eth = node.eth().account(Address::repeat_byte(0xa1)).build();
    let err = eth
        .nft(collection())
        .unwrap()
        .burn(1u64)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Reverted(hash) if hash.to_string() == TX_HASH));
}

#[tokio::test]
async fn test_revert_reason_on_submission() {
    let node = MockNode::start().await;
    let reason = alloy_sol_types::Revert {
        reason: "ERC721: caller is not token owner or approved".into(),
    };
    let data = format!(
        "0x{}",
        hex::encode(alloy_sol_types::SolError::abi_encode(&reason))
    );
    node.error(
        "eth_sendTransaction",
        3,
        "execution reverted: ERC721: caller is not token owner or approved",
        Some(json!(data)),
    );

    let eth = node.eth().account(Address::repeat_byte(0xa1)).build();
    let err = eth
        .nft(collection())
        .unwrap()
        .burn(1u64)
        .await
        .unwrap_err();
    match err {
        Error::Rpc(RpcError::ExecutionReverted { reason, .. }) => {
            assert_eq!(
                reason.as_deref(),
                Some("ERC721: caller is not token owner or approved")
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_receipt_timeout() {
    let node = MockNode::start().await;
    node.result("eth_sendTransaction", json!(TX_HASH));
    node.result("eth_getTransactionReceipt", json!(null));

    let eth = node.eth().account(Address::repeat_byte(0xa1)).build();
    let err = eth
        .nft(collection())
        .unwrap()
        .burn(1u64)
        .receipt_timeout(std::time::Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReceiptTimeout { .. }), "unexpected error: {err:?}");
    assert!(node.calls("eth_getTransactionReceipt").len() >= 2);
}

#[tokio::test]
async fn test_pending_then_receipt() {
    let node = MockNode::start().await;
    node.mine(1, None);

    let eth = node.eth().account(Address::repeat_byte(0xa1)).build();
    let pending = eth
        .nft(collection())
        .unwrap()
        .approve(Address::repeat_byte(0xb0), 1u64)
        .from(Address::repeat_byte(0xa1))
        .pending()
        .await
        .unwrap();
    assert_eq!(pending.hash().to_string(), TX_HASH);
    assert!(node.calls("eth_getTransactionReceipt").is_empty());

    let receipt = pending.receipt().await.unwrap();
    assert!(receipt.is_success());
}
