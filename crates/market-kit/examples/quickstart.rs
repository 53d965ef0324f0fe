//! Quickstart - Essential marketplace operations
//!
//! Covers: reading a collection, listing, buying, account switching
//!
//! Run: cargo run --example quickstart
//!
//! Environment:
//!   ETH_NETWORK=localhost            (or sepolia, goerli, an RPC URL)
//!   NFT_ADDRESS=0x...                (a deployed Tomosia NFT collection)
//!   MARKETPLACE_ADDRESS=0x...        (defaults to the known Goerli deployment)
//!   ETH_PRIVATE_KEY=0x...            (optional, for local signing)

use market_kit::*;

// ============================================================================
// 1. Read a collection (no account needed)
// ============================================================================

async fn view_example(nft: &Nft, holder: Address) -> Result<(), Error> {
    println!("=== View Example ===\n");

    println!("Collection owner: {}", nft.owner().await?);
    println!("Paused: {}", nft.paused().await?);

    let tokens = nft.owner_token_ids(holder).await?;
    println!("{} holds {} tokens", holder, tokens.len());

    for token_id in tokens.iter().take(3) {
        println!("  #{} -> {}", token_id, nft.token_uri(*token_id).await?);
    }

    Ok(())
}

// ============================================================================
// 2. Browse the marketplace
// ============================================================================

async fn browse_example(market: &Marketplace, collection: Address) -> Result<(), Error> {
    println!("\n=== Marketplace Listings ===\n");

    if !market.is_nft_address_supported(collection).await? {
        println!("{} is not listed on this marketplace", collection);
        return Ok(());
    }

    for item in market.fetch_market_items(collection).await? {
        println!(
            "  item #{}: token {} for {} ETH",
            item.itemId,
            item.tokenId,
            format_ether(item.price)
        );
    }

    Ok(())
}

// ============================================================================
// 3. List a token (requires an account holding it)
// ============================================================================

async fn list_example(nft: &Nft, market: &Marketplace, account: Address) -> Result<(), Error> {
    println!("\n=== List Example ===\n");

    let Some(token_id) = nft.owner_token_ids(account).await?.first().copied() else {
        println!("{} holds no tokens to list", account);
        return Ok(());
    };

    // The marketplace moves the token on sale
    if !nft.is_approved_for_all(account, market.address()).await? {
        nft.set_approval_for_all(market.address(), true)
            .from(account)
            .await?;
    }

    let receipt = market
        .create_market_item(token_id, nft.address(), parse_wei("0.01 ether")?)
        .await?;
    println!("Listed token {} in block {:?}", token_id, receipt.block());

    Ok(())
}

// ============================================================================
// 4. Buy the cheapest listing
// ============================================================================

async fn buy_example(market: &Marketplace, collection: Address) -> Result<(), Error> {
    println!("\n=== Buy Example ===\n");

    let items = market.fetch_market_items(collection).await?;
    let Some(item) = items.iter().min_by_key(|item| item.price) else {
        println!("Nothing for sale");
        return Ok(());
    };

    match market
        .buy_market_item(item.itemId, collection, item.price)
        .await
    {
        Ok(receipt) => println!("Bought item #{}: {}", item.itemId, receipt.transaction_hash),
        Err(Error::Rpc(RpcError::ExecutionReverted { reason, .. })) => {
            println!("Purchase refused: {}", reason.unwrap_or_default());
        }
        Err(e) => return Err(e),
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Error> {
    println!("market-kit Quickstart Examples\n");

    let eth = Eth::from_env()?;

    let nft_address = std::env::var("NFT_ADDRESS")
        .map_err(|_| Error::Config("NFT_ADDRESS is not set".to_string()))?;
    let nft = eth.nft(nft_address.as_str())?;
    let market = match std::env::var("MARKETPLACE_ADDRESS") {
        Ok(address) => eth.marketplace(address)?,
        Err(_) => eth.marketplace(KNOWN_MARKETPLACE_GOERLI)?,
    };

    let owner = nft.connect().await?;
    view_example(&nft, owner).await?;
    browse_example(&market, nft.address()).await?;

    match eth.account() {
        Some(account) => {
            list_example(&nft, &market, account).await?;
            buy_example(&market, nft.address()).await?;
        }
        None => {
            println!("\n---");
            println!("No account available. Set ETH_PRIVATE_KEY or use a node with unlocked accounts.");
        }
    }

    Ok(())
}
