//! Deploy the NFT collection and the marketplace from build artifacts
//!
//! Run: cargo run --example deploy -- build/contracts/TomosiaNFT.json build/contracts/Marketplace.json
//!
//! Deploys from ETH_PRIVATE_KEY if set, else from the node's first account.
//! Set RUST_LOG=market_kit=info to see the deployment log.

use market_kit::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("market_kit=info")),
        )
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        return Err(Error::Config(
            "usage: deploy <artifact.json> [<artifact.json> ...]".to_string(),
        ));
    }

    let eth = Eth::from_env()?;
    let account = eth.connect().await?;
    println!("Deploying from {} on {}", account, eth.network());

    let mut deployed = Vec::new();
    for path in &paths {
        let artifact = Artifact::from_file(path)?;
        let deployment = eth.deploy(&artifact).await?;
        println!(
            "{} deployed at {} (tx {})",
            artifact.contract_name, deployment.address, deployment.transaction_hash
        );
        deployed.push((artifact.contract_name, deployment.address));
    }

    // Whitelist the collection on the marketplace when both were deployed
    let nft = deployed.iter().find(|(name, _)| name.contains("NFT"));
    let market = deployed.iter().find(|(name, _)| name.contains("Market"));
    if let (Some((_, nft)), Some((_, market))) = (nft, market) {
        let market = eth.marketplace(*market)?;
        market.add_nft_support_address(*nft).await?;
        println!("Marketplace now accepts {}", nft);
    }

    Ok(())
}
