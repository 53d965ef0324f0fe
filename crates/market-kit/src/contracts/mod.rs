//! Clients for the NFT and marketplace contracts.
//!
//! # NFT
//!
//! ```rust,no_run
//! use market_kit::*;
//!
//! # async fn example() -> Result<(), Error> {
//! let eth = Eth::localhost().build();
//! let nft = eth.nft("0x5FbDB2315678afecb367f032d93F642f64180aa3")?;
//! nft.connect().await?;
//!
//! // Owner-only writes go from the cached owner
//! nft.mint_nfts(["ipfs://a.json", "ipfs://b.json"]).await?;
//! println!("Paused: {}", nft.paused().await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Marketplace
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use market_kit::*;
//!
//! # async fn example(nft: Address) -> Result<(), Error> {
//! let eth = Eth::goerli().private_key("0x...")?.build();
//! let market = eth.marketplace(KNOWN_MARKETPLACE_GOERLI)?;
//!
//! let items = market.fetch_market_items(nft).await?;
//! if let Some(item) = items.first() {
//!     market.buy_market_item(item.itemId, nft, item.price).await?;
//! }
//!
//! let mut created = market.market_item_created();
//! while let Some(Ok(log)) = created.next().await {
//!     println!("listed token {}", log.event.tokenId);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::watch;

pub mod abi;
mod known;
mod marketplace;
mod nft;

pub use abi::MarketItem;
pub use known::{IntoContractAddress, KNOWN_MARKETPLACE_GOERLI, KnownContract};
pub use marketplace::Marketplace;
pub use nft::Nft;

/// Last known contract owner, shared between facade clones.
///
/// `connect()` overwrites it so an ownership transfer is picked up on the
/// next connect.
#[derive(Clone)]
pub(crate) struct OwnerSlot(Arc<watch::Sender<Option<Address>>>);

impl OwnerSlot {
    pub(crate) fn new() -> Self {
        Self(Arc::new(watch::channel(None).0))
    }

    pub(crate) fn get(&self) -> Option<Address> {
        *self.0.borrow()
    }

    pub(crate) fn set(&self, owner: Address) {
        self.0.send_replace(Some(owner));
    }
}
