//! NFT marketplace contract client.

use alloy_primitives::{Address, U256};
use futures::FutureExt;
use tracing::debug;

use crate::client::{ContractCall, ContractSend, Eth};
use crate::error::Error;
use crate::events::EventSubscription;
use crate::types::IntoTokenId;

use super::OwnerSlot;
use super::abi::{MarketItem, Marketplace as MarketplaceAbi};

/// Client for the NFT marketplace contract.
///
/// Create via [`Eth::marketplace()`](crate::Eth::marketplace). All writes are
/// sent from the client's selected account unless `.from()` says otherwise.
///
/// # Example
///
/// ```rust,no_run
/// use market_kit::*;
///
/// # async fn example(nft_address: Address) -> Result<(), Error> {
/// let eth = Eth::goerli().private_key("0x...")?.build();
/// let market = eth.marketplace(KNOWN_MARKETPLACE_GOERLI)?;
///
/// // List token 1 for 0.05 ether
/// market
///     .create_market_item(1u64, nft_address, parse_wei("0.05 ether")?)
///     .await?;
///
/// for item in market.fetch_market_items(nft_address).await? {
///     println!("#{} token {} at {}", item.itemId, item.tokenId, format_ether(item.price));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Marketplace {
    eth: Eth,
    address: Address,
    owner: OwnerSlot,
}

impl Marketplace {
    pub(crate) fn new(eth: Eth, address: Address) -> Self {
        Self {
            eth,
            address,
            owner: OwnerSlot::new(),
        }
    }

    /// The contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Refresh the cached owner, and select an account if none is.
    pub async fn connect(&self) -> Result<Address, Error> {
        let owner = self.owner().await?;
        self.owner.set(owner);

        if self.eth.account().is_none() {
            match self.eth.connect().await {
                Ok(_) | Err(Error::NoAccount) => {}
                Err(e) => return Err(e),
            }
        }

        debug!(contract = %self.address, %owner, account = ?self.eth.account(), "marketplace connected");
        Ok(owner)
    }

    /// The contract owner, fetched on first use and cached.
    ///
    /// The cache is refreshed by [`connect()`](Self::connect).
    pub async fn cached_owner(&self) -> Result<Address, Error> {
        if let Some(owner) = self.owner.get() {
            return Ok(owner);
        }
        let owner = self.owner().await?;
        self.owner.set(owner);
        Ok(owner)
    }

    fn send<C: alloy_sol_types::SolCall>(&self, call: &C) -> ContractSend {
        ContractSend::call(self.eth.clone(), self.address, call)
    }

    // =========================================================================
    // View Methods
    // =========================================================================

    /// Current contract owner (`owner`).
    pub fn owner(&self) -> ContractCall<MarketplaceAbi::ownerCall, Address> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            MarketplaceAbi::ownerCall {},
            |r| r._0,
        )
    }

    /// Whether `nft_contract` may be listed (`isNFTAddressSupported`).
    pub fn is_nft_address_supported(
        &self,
        nft_contract: Address,
    ) -> ContractCall<MarketplaceAbi::isNFTAddressSupportedCall, bool> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            MarketplaceAbi::isNFTAddressSupportedCall {
                nftContract: nft_contract,
            },
            |r| r._0,
        )
    }

    /// Unsold items of a collection (`fetchMarketItems`).
    pub fn fetch_market_items(
        &self,
        nft_contract: Address,
    ) -> ContractCall<MarketplaceAbi::fetchMarketItemsCall, Vec<MarketItem>> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            MarketplaceAbi::fetchMarketItemsCall {
                nftContract: nft_contract,
            },
            |r| r._0,
        )
    }

    /// Items of a collection bought by `sender` (`fetchMyNFTs`).
    pub fn fetch_my_nfts(
        &self,
        sender: Address,
        nft_contract: Address,
    ) -> ContractCall<MarketplaceAbi::fetchMyNFTsCall, Vec<MarketItem>> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            MarketplaceAbi::fetchMyNFTsCall {
                sender,
                nftContract: nft_contract,
            },
            |r| r._0,
        )
    }

    /// Items of a collection listed by `sender` (`fetchItemsCreated`).
    pub fn fetch_items_created(
        &self,
        sender: Address,
        nft_contract: Address,
    ) -> ContractCall<MarketplaceAbi::fetchItemsCreatedCall, Vec<MarketItem>> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            MarketplaceAbi::fetchItemsCreatedCall {
                sender,
                nftContract: nft_contract,
            },
            |r| r._0,
        )
    }

    // =========================================================================
    // Admin Methods
    // =========================================================================

    /// Whitelist an NFT collection (`addNFTSupportAddress`).
    ///
    /// Fails with [`Error::NotOwner`] before submitting if the sender is not
    /// the contract owner. The check also covers a sender set with `.from()`.
    pub fn add_nft_support_address(&self, nft_contract: Address) -> ContractSend {
        let call = MarketplaceAbi::addNFTSupportAddressCall {
            nftContract: nft_contract,
        };
        let market = self.clone();
        self.send(&call).check_sender(move |account| {
            async move {
                let owner = market.cached_owner().await?;
                if account != owner {
                    return Err(Error::NotOwner { owner, account });
                }
                Ok(())
            }
            .boxed()
        })
    }

    /// Point at the contract to migrate from (`setOldContract`).
    pub fn set_old_contract(&self, old_contract: Address) -> ContractSend {
        self.send(&MarketplaceAbi::setOldContractCall {
            oldContract: old_contract,
        })
    }

    /// Point at the contract to migrate to (`setNewContract`).
    pub fn set_new_contract(&self, new_contract: Address) -> ContractSend {
        self.send(&MarketplaceAbi::setNewContractCall {
            newContract: new_contract,
        })
    }

    /// Move listings to the new contract (`migrate`).
    pub fn migrate(&self) -> ContractSend {
        self.send(&MarketplaceAbi::migrateCall {})
    }

    // =========================================================================
    // Trading Methods
    // =========================================================================

    /// List several tokens at one price (`createMarketItems`).
    pub fn create_market_items<I, T>(
        &self,
        token_ids: I,
        nft_contract: Address,
        price: U256,
    ) -> ContractSend
    where
        I: IntoIterator<Item = T>,
        T: IntoTokenId,
    {
        self.send(&MarketplaceAbi::createMarketItemsCall {
            tokenIds: token_ids.into_iter().map(IntoTokenId::into_token_id).collect(),
            nftContract: nft_contract,
            price,
        })
    }

    /// List a token (`createMarketItem`).
    pub fn create_market_item(
        &self,
        token_id: impl IntoTokenId,
        nft_contract: Address,
        price: U256,
    ) -> ContractSend {
        self.send(&MarketplaceAbi::createMarketItemCall {
            tokenId: token_id.into_token_id(),
            nftContract: nft_contract,
            price,
        })
    }

    /// Change a listing's price (`changeMarketItem`).
    pub fn change_market_item(
        &self,
        token_id: impl IntoTokenId,
        nft_contract: Address,
        price: U256,
    ) -> ContractSend {
        self.send(&MarketplaceAbi::changeMarketItemCall {
            tokenId: token_id.into_token_id(),
            nftContract: nft_contract,
            price,
        })
    }

    /// Buy a listed item, paying `price` (`buyMarketItem`).
    pub fn buy_market_item(
        &self,
        item_id: impl IntoTokenId,
        nft_contract: Address,
        price: U256,
    ) -> ContractSend {
        self.send(&MarketplaceAbi::buyMarketItemCall {
            itemId: item_id.into_token_id(),
            nftContract: nft_contract,
        })
        .value(price)
    }

    /// Withdraw a listing (`cancelMarketItem`).
    pub fn cancel_market_item(
        &self,
        item_id: impl IntoTokenId,
        nft_contract: Address,
    ) -> ContractSend {
        self.send(&MarketplaceAbi::cancelMarketItemCall {
            itemId: item_id.into_token_id(),
            nftContract: nft_contract,
        })
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// New listings.
    pub fn market_item_created(&self) -> EventSubscription<MarketplaceAbi::MarketItemCreated> {
        self.eth.events(self.address)
    }

    /// Withdrawn listings.
    pub fn market_item_cancelled(&self) -> EventSubscription<MarketplaceAbi::MarketItemCancelled> {
        self.eth.events(self.address)
    }

    /// Completed sales.
    pub fn market_item_sold(&self) -> EventSubscription<MarketplaceAbi::MarketItemSold> {
        self.eth.events(self.address)
    }
}

impl std::fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marketplace")
            .field("address", &self.address)
            .field("owner", &self.owner.get())
            .finish()
    }
}
