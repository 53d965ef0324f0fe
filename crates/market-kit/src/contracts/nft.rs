//! Tomosia NFT contract client.

use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::client::{ContractCall, ContractSend, Eth, Sender};
use crate::error::Error;
use crate::types::IntoTokenId;

use super::OwnerSlot;
use super::abi::TomosiaNFT;

/// Client for a Tomosia NFT (ERC-721) contract.
///
/// Create via [`Eth::nft()`](crate::Eth::nft). Cloning is cheap and clones
/// share the cached owner.
///
/// # Senders
///
/// Administrative writes (`set_base_uri`, minting, approvals) are sent from
/// the contract owner, fetched on first use and refreshed by `connect()`.
/// Transfers and burns are sent from the client's selected account. Every
/// write accepts `.from()` to override this.
///
/// # Example
///
/// ```rust,no_run
/// use market_kit::*;
///
/// # async fn example() -> Result<(), Error> {
/// let eth = Eth::localhost().build();
/// let nft = eth.nft("0x5FbDB2315678afecb367f032d93F642f64180aa3")?;
/// nft.connect().await?;
///
/// nft.mint_nft("ipfs://bafy.../1.json").await?;
/// let me = eth.account().unwrap();
/// println!("{} holds {} tokens", me, nft.balance_of(me).await?);
///
/// let ids = nft.owner_token_ids(me).await?;
/// nft.transfer_from(me, Address::repeat_byte(0xbb), ids[0]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Nft {
    eth: Eth,
    address: Address,
    owner: OwnerSlot,
}

impl Nft {
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
    ///
    /// A node without accounts is not an error here; writes from the
    /// selected account fail with [`Error::NoAccount`] later instead.
    pub async fn connect(&self) -> Result<Address, Error> {
        let owner = self.owner().await?;
        self.owner.set(owner);

        if self.eth.account().is_none() {
            match self.eth.connect().await {
                Ok(_) | Err(Error::NoAccount) => {}
                Err(e) => return Err(e),
            }
        }

        debug!(contract = %self.address, %owner, account = ?self.eth.account(), "nft connected");
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

    fn from_owner(&self, send: ContractSend) -> ContractSend {
        let nft = self.clone();
        send.sender(Sender::Resolve(Box::pin(async move {
            nft.cached_owner().await
        })))
    }

    // =========================================================================
    // View Methods
    // =========================================================================

    /// Current contract owner (`owner`).
    pub fn owner(&self) -> ContractCall<TomosiaNFT::ownerCall, Address> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            TomosiaNFT::ownerCall {},
            |r| r._0,
        )
    }

    /// Token ids held by `owner` (`ownerTokenIds`).
    pub fn owner_token_ids(
        &self,
        owner: Address,
    ) -> ContractCall<TomosiaNFT::ownerTokenIdsCall, Vec<U256>> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            TomosiaNFT::ownerTokenIdsCall { owner },
            |r| r._0,
        )
    }

    /// Number of tokens held by `owner` (`balanceOf`).
    pub fn balance_of(&self, owner: Address) -> ContractCall<TomosiaNFT::balanceOfCall, U256> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            TomosiaNFT::balanceOfCall { owner },
            |r| r._0,
        )
    }

    /// Whether `operator` may manage all of `owner`'s tokens (`isApprovedForAll`).
    pub fn is_approved_for_all(
        &self,
        owner: Address,
        operator: Address,
    ) -> ContractCall<TomosiaNFT::isApprovedForAllCall, bool> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            TomosiaNFT::isApprovedForAllCall { owner, operator },
            |r| r._0,
        )
    }

    /// Holder of `token_id` (`ownerOf`).
    pub fn owner_of(
        &self,
        token_id: impl IntoTokenId,
    ) -> ContractCall<TomosiaNFT::ownerOfCall, Address> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            TomosiaNFT::ownerOfCall {
                tokenId: token_id.into_token_id(),
            },
            |r| r._0,
        )
    }

    /// Whether the contract is paused (`paused`).
    pub fn paused(&self) -> ContractCall<TomosiaNFT::pausedCall, bool> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            TomosiaNFT::pausedCall {},
            |r| r._0,
        )
    }

    /// Metadata URI of `token_id` (`tokenURI`).
    pub fn token_uri(
        &self,
        token_id: impl IntoTokenId,
    ) -> ContractCall<TomosiaNFT::tokenURICall, String> {
        ContractCall::with_decoder(
            self.eth.rpc.clone(),
            self.address,
            TomosiaNFT::tokenURICall {
                tokenId: token_id.into_token_id(),
            },
            |r| r._0,
        )
    }

    // =========================================================================
    // Owner Methods
    // =========================================================================

    /// Set the base URI for token metadata. Sent from the owner.
    pub fn set_base_uri(&self, base_uri: impl Into<String>) -> ContractSend {
        let call = TomosiaNFT::setBaseURICall {
            baseURI: base_uri.into(),
        };
        self.from_owner(ContractSend::call(self.eth.clone(), self.address, &call))
    }

    /// Mint one token per URI. Sent from the owner.
    pub fn mint_nfts<I, S>(&self, token_uris: I) -> ContractSend
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let call = TomosiaNFT::mintNftsCall {
            tokenURIs: token_uris.into_iter().map(Into::into).collect(),
        };
        self.from_owner(ContractSend::call(self.eth.clone(), self.address, &call))
    }

    /// Mint a single token. Sent from the owner.
    pub fn mint_nft(&self, token_uri: impl Into<String>) -> ContractSend {
        let call = TomosiaNFT::mintNftCall {
            tokenURI: token_uri.into(),
        };
        self.from_owner(ContractSend::call(self.eth.clone(), self.address, &call))
    }

    /// Approve or revoke `operator` for all tokens. Sent from the owner.
    pub fn set_approval_for_all(&self, operator: Address, approved: bool) -> ContractSend {
        let call = TomosiaNFT::setApprovalForAllCall { operator, approved };
        self.from_owner(ContractSend::call(self.eth.clone(), self.address, &call))
    }

    /// Approve `to` for a single token. Sent from the owner.
    pub fn approve(&self, to: Address, token_id: impl IntoTokenId) -> ContractSend {
        let call = TomosiaNFT::approveCall {
            to,
            tokenId: token_id.into_token_id(),
        };
        self.from_owner(ContractSend::call(self.eth.clone(), self.address, &call))
    }

    // =========================================================================
    // Holder Methods
    // =========================================================================

    /// Safe transfer (`safeTransferFrom`). Sent from the selected account.
    pub fn safe_transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: impl IntoTokenId,
    ) -> ContractSend {
        let call = TomosiaNFT::safeTransferFromCall {
            from,
            to,
            tokenId: token_id.into_token_id(),
        };
        ContractSend::call(self.eth.clone(), self.address, &call)
    }

    /// Unchecked transfer (`transferFrom`). Sent from the selected account.
    pub fn transfer_from(
        &self,
        from: Address,
        to: Address,
        token_id: impl IntoTokenId,
    ) -> ContractSend {
        let call = TomosiaNFT::transferFromCall {
            from,
            to,
            tokenId: token_id.into_token_id(),
        };
        ContractSend::call(self.eth.clone(), self.address, &call)
    }

    /// Destroy a token. Sent from the selected account.
    pub fn burn(&self, token_id: impl IntoTokenId) -> ContractSend {
        let call = TomosiaNFT::burnCall {
            tokenId: token_id.into_token_id(),
        };
        ContractSend::call(self.eth.clone(), self.address, &call)
    }
}

impl std::fmt::Debug for Nft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nft")
            .field("address", &self.address)
            .field("owner", &self.owner.get())
            .finish()
    }
}
