//! A Rust client for the Tomosia NFT and marketplace contracts.
//!
//! **market-kit** wraps an ERC-721 collection and a fixed-price NFT
//! marketplace behind typed facades, on top of plain Ethereum JSON-RPC.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use market_kit::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), market_kit::Error> {
//!     // Configure once
//!     let eth = Eth::localhost().build();
//!     let account = eth.connect().await?;
//!
//!     let nft = eth.nft("0x5FbDB2315678afecb367f032d93F642f64180aa3")?;
//!     println!("{} owns {} tokens", account, nft.balance_of(account).await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Design Principles
//!
//! 1. **Single entry point**: Everything hangs off the [`Eth`] client
//! 2. **Configure once**: Network, signer and account set at client creation
//! 3. **Shared account**: Facades read the selected account at call time, so
//!    switching accounts applies everywhere
//! 4. **Explicit units**: Amount strings need a unit such as `ether` or `gwei`
//! 5. **Futures as builders**: Reads and writes are configured, then awaited
//!
//! # Core Types
//!
//! - [`Address`], [`U256`], [`Bytes`], [`B256`] - from `alloy-primitives`
//! - [`SecretKey`], [`Signature`] - secp256k1 keys
//! - [`TransactionReceipt`], [`Log`] - node responses
//! - [`MarketItem`] - a marketplace listing
//!
//! # Amounts
//!
//! ```
//! use market_kit::{U256, parse_wei};
//!
//! let price = parse_wei("0.05 ether").unwrap();
//! assert_eq!(price, U256::from(50_000_000_000_000_000u64));
//! ```
//!
//! # Arbitrary Contract Calls
//!
//! The generated bindings in [`abi`] work with [`Eth::view`] and
//! [`Eth::send`] for anything the facades don't cover:
//!
//! ```rust,no_run
//! # use market_kit::*;
//! # async fn example(eth: Eth, nft: Address) -> Result<(), Error> {
//! let paused = eth.view(nft, abi::TomosiaNFT::pausedCall {}).await?._0;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod contracts;
pub mod deploy;
pub mod error;
pub mod events;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ArtifactError, Error, ParseAmountError, ParseKeyError, RpcError, SignerError};
pub use types::*;

// Re-export client types
pub use client::{
    AccountChanges, AccountSelection, ContractCall, ContractSend, EnvSigner, Eth, EthBuilder,
    LocalSigner, PendingTransaction, RetryConfig, RpcClient, SignFuture, Signer,
};

// Re-export contract types
pub use contracts::{
    IntoContractAddress, KNOWN_MARKETPLACE_GOERLI, KnownContract, MarketItem, Marketplace, Nft,
    abi,
};
pub use deploy::{Artifact, DEFAULT_DEPLOY_GAS, DeployCall, Deployment};
pub use events::{DecodedLog, EventSubscription};
