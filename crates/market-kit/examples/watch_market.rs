//! Follow marketplace activity and the node's selected account
//!
//! Run: cargo run --example watch_market
//!
//! Environment:
//!   ETH_NETWORK=localhost
//!   MARKETPLACE_ADDRESS=0x...   (defaults to the known Goerli deployment)

use std::time::Duration;

use futures::StreamExt;
use market_kit::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("market_kit=info")),
        )
        .init();

    let eth = Eth::from_env()?;
    let market = match std::env::var("MARKETPLACE_ADDRESS") {
        Ok(address) => eth.marketplace(address)?,
        Err(_) => eth.marketplace(KNOWN_MARKETPLACE_GOERLI)?,
    };
    market.connect().await?;

    let mut accounts = eth.watch_accounts(Duration::from_secs(2));
    let mut created = market.market_item_created();
    let mut sold = market.market_item_sold();
    let mut cancelled = market.market_item_cancelled();

    loop {
        tokio::select! {
            Some(change) = accounts.next() => match change {
                Ok(Some(account)) => println!("account -> {}", account),
                Ok(None) => println!("no account selected"),
                Err(e) => eprintln!("account poll failed: {}", e),
            },
            Some(event) = created.next() => match event {
                Ok(log) => println!(
                    "listed item #{} (token {}) for {} ETH",
                    log.event.itemId, log.event.tokenId, format_ether(log.event.price)
                ),
                Err(e) => eprintln!("poll failed: {}", e),
            },
            Some(event) = sold.next() => match event {
                Ok(log) => println!("sold item #{} to {}", log.event.itemId, log.event.owner),
                Err(e) => eprintln!("poll failed: {}", e),
            },
            Some(event) = cancelled.next() => match event {
                Ok(log) => println!("cancelled item #{}", log.event.itemId),
                Err(e) => eprintln!("poll failed: {}", e),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
