use std::time::Duration;

use futures::StreamExt;
use market_kit::*;

use crate::common::{deploy_pair, devnet};

#[tokio::test]
async fn test_mint_list_and_buy() {
    let eth = devnet();
    let (nft, market) = deploy_pair(&eth).await;
    let accounts = eth.rpc().accounts().await.unwrap();
    let (seller, buyer) = (accounts[0], accounts[1]);

    nft.connect().await.unwrap();
    market.connect().await.unwrap();
    assert_eq!(eth.account(), Some(seller));

    market.add_nft_support_address(nft.address()).await.unwrap();
    assert!(market.is_nft_address_supported(nft.address()).await.unwrap());

    nft.mint_nft("ipfs://tomosia/1").await.unwrap();
    let tokens = nft.owner_token_ids(seller).await.unwrap();
    assert_eq!(tokens.len(), 1);
    let token_id = tokens[0];
    assert_eq!(nft.owner_of(token_id).await.unwrap(), seller);

    nft.set_approval_for_all(market.address(), true).await.unwrap();

    let head = eth.block_number().await.unwrap();
    let mut created = market
        .market_item_created()
        .from_block(head)
        .poll_interval(Duration::from_millis(200));

    let price = parse_wei("0.01 ether").unwrap();
    market
        .create_market_item(token_id, nft.address(), price)
        .await
        .unwrap();

    let listed = created.next().await.unwrap().unwrap();
    assert_eq!(listed.event.tokenId, token_id);
    assert_eq!(listed.event.price, price);

    let items = market.fetch_market_items(nft.address()).await.unwrap();
    let item = items
        .iter()
        .find(|item| item.tokenId == token_id)
        .expect("listing should be visible");

    eth.select_account(buyer);
    market
        .buy_market_item(item.itemId, nft.address(), item.price)
        .await
        .unwrap();

    let mine = market.fetch_my_nfts(buyer, nft.address()).await.unwrap();
    assert!(mine.iter().any(|i| i.tokenId == token_id));
}

#[tokio::test]
async fn test_non_owner_cannot_add_support() {
    let eth = devnet();
    let (nft, market) = deploy_pair(&eth).await;
    let accounts = eth.rpc().accounts().await.unwrap();

    eth.select_account(accounts[1]);
    let err = market
        .add_nft_support_address(nft.address())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotOwner { .. }));
}

#[tokio::test]
async fn test_transfer_between_accounts() {
    let eth = devnet();
    let (nft, _) = deploy_pair(&eth).await;
    let accounts = eth.rpc().accounts().await.unwrap();

    nft.mint_nft("ipfs://tomosia/2").await.unwrap();
    let token_id = nft.owner_token_ids(accounts[0]).await.unwrap()[0];

    nft.transfer_from(accounts[0], accounts[1], token_id)
        .await
        .unwrap();
    assert_eq!(nft.owner_of(token_id).await.unwrap(), accounts[1]);
    assert_eq!(nft.balance_of(accounts[1]).await.unwrap(), U256::from(1));
}
