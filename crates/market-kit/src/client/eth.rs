//! The main Eth client.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, SolEvent};
use tokio::sync::OnceCell;
use tracing::info;

use crate::contracts::{IntoContractAddress, Marketplace, Nft};
use crate::deploy::{Artifact, DeployCall};
use crate::error::Error;
use crate::events::EventSubscription;
use crate::types::{BlockId, Network};

use super::accounts::{self, AccountChanges, AccountSelection};
use super::call::{ContractCall, ContractSend, DEFAULT_POLL_INTERVAL, DEFAULT_RECEIPT_TIMEOUT};
use super::rpc::{RetryConfig, RpcClient};
use super::signer::{LocalSigner, Signer};

/// The main client for interacting with Ethereum contracts.
///
/// `Eth` is the single entry point: it owns the RPC connection, the optional
/// local signer and the selected account, and hands out contract facades
/// that share them. Clones share all state.
///
/// # Example
///
/// ```rust,no_run
/// use market_kit::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), market_kit::Error> {
///     // Node-managed accounts (anvil, ganache, hardhat)
///     let eth = Eth::localhost().build();
///     let account = eth.connect().await?;
///     println!("Using {}", account);
///
///     let market = eth.marketplace(KNOWN_MARKETPLACE_GOERLI)?;
///     let owner = market.owner().await?;
///     println!("Marketplace owner: {}", owner);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Eth {
    pub(crate) rpc: Arc<RpcClient>,
    pub(crate) signer: Option<Arc<dyn Signer>>,
    pub(crate) accounts: AccountSelection,
    pub(crate) receipt_timeout: Duration,
    pub(crate) poll_interval: Duration,
    network: Network,
    chain_id: Arc<OnceCell<u64>>,
}

impl Eth {
    /// Create a builder for mainnet.
    pub fn mainnet() -> EthBuilder {
        EthBuilder::preset(Network::Mainnet)
    }

    /// Create a builder for Sepolia.
    pub fn sepolia() -> EthBuilder {
        EthBuilder::preset(Network::Sepolia)
    }

    /// Create a builder for Goerli.
    pub fn goerli() -> EthBuilder {
        EthBuilder::preset(Network::Goerli)
    }

    /// Create a builder for a local development node on `127.0.0.1:8545`.
    pub fn localhost() -> EthBuilder {
        EthBuilder::preset(Network::Localhost)
    }

    /// Create a builder with a custom RPC URL.
    pub fn custom(rpc_url: impl Into<String>) -> EthBuilder {
        EthBuilder::new(rpc_url, Network::Custom)
    }

    /// Create a configured client from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `ETH_NETWORK` (optional): `"mainnet"`, `"sepolia"`, `"goerli"`,
    ///   `"localhost"`, or a custom RPC URL. Defaults to `"localhost"`.
    /// - `ETH_PRIVATE_KEY` (optional): hex private key for local signing.
    /// - `ETH_ACCOUNT` (optional): address to select initially. Ignored
    ///   when `ETH_PRIVATE_KEY` is set.
    ///
    /// ```bash
    /// export ETH_NETWORK=sepolia
    /// export ETH_PRIVATE_KEY=0x...
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if `ETH_PRIVATE_KEY` or `ETH_ACCOUNT` cannot be parsed.
    pub fn from_env() -> Result<Eth, Error> {
        let network = std::env::var("ETH_NETWORK").ok();
        let private_key = std::env::var("ETH_PRIVATE_KEY").ok();
        let account = std::env::var("ETH_ACCOUNT").ok();

        let mut builder = match network.as_deref() {
            None => Eth::localhost(),
            Some(name) => match Network::from_name(name) {
                Some(network) => EthBuilder::preset(network),
                None => Eth::custom(name),
            },
        };

        match (private_key, account) {
            (Some(key), _) => {
                builder = builder.private_key(&key)?;
            }
            (None, Some(account)) => {
                let account: Address = account
                    .trim()
                    .parse()
                    .map_err(|_| Error::ParseAddress(account.clone()))?;
                builder = builder.account(account);
            }
            (None, None) => {
                // Resolved later through connect()
            }
        }

        Ok(builder.build())
    }

    /// Get the underlying RPC client.
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Get the RPC URL.
    pub fn rpc_url(&self) -> &str {
        self.rpc.url()
    }

    /// Get the network this client was configured for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Get the local signer's address, if a signer is configured.
    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    /// The currently selected account.
    pub fn account(&self) -> Option<Address> {
        self.accounts.current()
    }

    /// The shared account selection.
    pub fn accounts(&self) -> &AccountSelection {
        &self.accounts
    }

    /// Select the account used by writes that don't name a sender.
    pub fn select_account(&self, account: Address) {
        self.accounts.select(account);
    }

    /// Resolve and select the account to send from.
    ///
    /// With a local signer this is the signer's address. Otherwise it is the
    /// first account the node manages (`eth_accounts`).
    pub async fn connect(&self) -> Result<Address, Error> {
        let account = match self.signer_address() {
            Some(address) => address,
            None => self
                .rpc
                .accounts()
                .await?
                .first()
                .copied()
                .ok_or(Error::NoAccount)?,
        };

        self.accounts.select(account);
        info!(%account, network = %self.network, "connected");
        Ok(account)
    }

    /// Follow the node's account list.
    ///
    /// Polls `eth_accounts` every `interval` and selects its first entry
    /// whenever it changes, clearing the selection if the list empties.
    /// Polling only runs while the returned stream is driven.
    ///
    /// A client with a local signer always sends from the signer, so the
    /// stream selects the signer's address, yields it once and does not poll.
    ///
    /// ```rust,no_run
    /// # use market_kit::*;
    /// # use std::time::Duration;
    /// use futures::StreamExt;
    ///
    /// # async fn example(eth: Eth) {
    /// let mut changes = eth.watch_accounts(Duration::from_secs(2));
    /// while let Some(change) = changes.next().await {
    ///     match change {
    ///         Ok(Some(account)) => println!("Switched to {}", account),
    ///         Ok(None) => println!("Wallet locked"),
    ///         Err(e) => eprintln!("Poll failed: {}", e),
    ///     }
    /// }
    /// # }
    /// ```
    pub fn watch_accounts(&self, interval: Duration) -> AccountChanges {
        accounts::watch_accounts(
            self.rpc.clone(),
            self.accounts.clone(),
            self.signer_address(),
            interval,
        )
    }

    /// Chain id of the connected node. Cached after the first call.
    pub async fn chain_id(&self) -> Result<u64, Error> {
        let id = self
            .chain_id
            .get_or_try_init(|| async { self.rpc.chain_id().await })
            .await?;
        Ok(*id)
    }

    /// Latest block height.
    pub async fn block_number(&self) -> Result<u64, Error> {
        Ok(self.rpc.block_number().await?)
    }

    /// Balance of `address` in wei.
    pub async fn balance(&self, address: Address) -> Result<U256, Error> {
        Ok(self.rpc.balance(address, BlockId::Latest).await?)
    }

    // ========================================================================
    // Contract calls
    // ========================================================================

    /// Read-only call of any ABI method.
    ///
    /// ```rust,no_run
    /// # use market_kit::*;
    /// # async fn example(eth: Eth, nft: Address) -> Result<(), Error> {
    /// let uri = eth
    ///     .view(nft, abi::TomosiaNFT::tokenURICall { tokenId: U256::from(1) })
    ///     .await?
    ///     ._0;
    /// # Ok(())
    /// # }
    /// ```
    pub fn view<C: SolCall>(&self, to: Address, call: C) -> ContractCall<C, C::Return> {
        ContractCall::new(self.rpc.clone(), to, call)
    }

    /// State-changing call of any ABI method, sent from the selected account.
    pub fn send<C: SolCall>(&self, to: Address, call: C) -> ContractSend {
        ContractSend::call(self.clone(), to, &call)
    }

    /// Event stream of `E` emitted by `address`.
    pub fn events<E: SolEvent + Send + 'static>(&self, address: Address) -> EventSubscription<E> {
        EventSubscription::new(self.rpc.clone(), address)
    }

    /// Get a client for a Tomosia NFT contract.
    pub fn nft(&self, contract: impl IntoContractAddress) -> Result<Nft, Error> {
        let address = contract.into_contract_address(self.network)?;
        Ok(Nft::new(self.clone(), address))
    }

    /// Get a client for an NFT marketplace contract.
    ///
    /// Accepts a raw address or a known deployment such as
    /// [`KNOWN_MARKETPLACE_GOERLI`](crate::KNOWN_MARKETPLACE_GOERLI).
    pub fn marketplace(&self, contract: impl IntoContractAddress) -> Result<Marketplace, Error> {
        let address = contract.into_contract_address(self.network)?;
        Ok(Marketplace::new(self.clone(), address))
    }

    /// Deploy a compiled contract.
    ///
    /// ```rust,no_run
    /// # use market_kit::*;
    /// # async fn example(eth: Eth) -> Result<(), Error> {
    /// let artifact = Artifact::from_file("build/contracts/TomosiaNFT.json")?;
    /// let deployment = eth.deploy(&artifact).await?;
    /// println!("{} at {}", artifact.contract_name, deployment.address);
    /// # Ok(())
    /// # }
    /// ```
    pub fn deploy(&self, artifact: &Artifact) -> DeployCall {
        DeployCall::new(self.clone(), artifact)
    }
}

impl std::fmt::Debug for Eth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eth")
            .field("rpc", &self.rpc)
            .field("network", &self.network)
            .field("signer", &self.signer_address())
            .field("account", &self.account())
            .finish()
    }
}

/// Builder for creating an [`Eth`] client.
///
/// ```rust,ignore
/// use market_kit::*;
///
/// // Node signs with its own accounts
/// let eth = Eth::localhost().build();
///
/// // Local key
/// let eth = Eth::sepolia()
///     .private_key("0x...")?
///     .retry_config(RetryConfig::none())
///     .build();
/// ```
pub struct EthBuilder {
    rpc_url: String,
    network: Network,
    signer: Option<Arc<dyn Signer>>,
    account: Option<Address>,
    retry_config: RetryConfig,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl EthBuilder {
    fn new(rpc_url: impl Into<String>, network: Network) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            network,
            signer: None,
            account: None,
            retry_config: RetryConfig::default(),
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    fn preset(network: Network) -> Self {
        let url = network.default_rpc_url().unwrap_or_default();
        Self::new(url, network)
    }

    /// Set the signer for transactions.
    ///
    /// The signer's address is selected as the account.
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// Sign locally with a hex private key.
    pub fn private_key(self, private_key: impl AsRef<str>) -> Result<Self, Error> {
        let signer = LocalSigner::new(private_key)?;
        Ok(self.signer(signer))
    }

    /// Select `account` initially, for node-managed accounts.
    pub fn account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Default receipt timeout for writes.
    pub fn receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Default delay between receipt polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build the client.
    pub fn build(self) -> Eth {
        let initial = self
            .signer
            .as_ref()
            .map(|signer| signer.address())
            .or(self.account);
        let accounts = match initial {
            Some(account) => AccountSelection::with_account(account),
            None => AccountSelection::new(),
        };

        Eth {
            rpc: Arc::new(RpcClient::with_retry_config(
                self.rpc_url,
                self.retry_config,
            )),
            signer: self.signer,
            accounts,
            receipt_timeout: self.receipt_timeout,
            poll_interval: self.poll_interval,
            network: self.network,
            chain_id: Arc::new(OnceCell::new()),
        }
    }
}

impl From<EthBuilder> for Eth {
    fn from(builder: EthBuilder) -> Self {
        builder.build()
    }
}
