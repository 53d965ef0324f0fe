//! Client module for talking to Ethereum nodes.
//!
//! This module provides the core client infrastructure:
//!
//! - [`Eth`]: The main client, the single entry point for all operations
//! - [`EthBuilder`]: Fluent builder for configuring the client
//! - [`RpcClient`]: Low-level JSON-RPC client with retry logic
//!
//! # Signers
//!
//! | Signer | Use Case |
//! |--------|----------|
//! | none | Node-managed accounts (`eth_accounts` / `eth_sendTransaction`) |
//! | [`LocalSigner`] | Scripts with a private key in memory |
//! | [`EnvSigner`] | CI/CD via the `ETH_PRIVATE_KEY` env var |
//!
//! # Call Builders
//!
//! - [`ContractCall`]: `eth_call` of an ABI method
//! - [`ContractSend`]: Transaction calling an ABI method, awaited to its receipt
//! - [`PendingTransaction`]: Submitted transaction, awaited separately

mod accounts;
mod call;
mod eth;
mod rpc;
mod signer;

pub use accounts::{AccountChanges, AccountSelection};
pub use call::{
    ContractCall, ContractSend, DEFAULT_POLL_INTERVAL, DEFAULT_RECEIPT_TIMEOUT,
    PendingTransaction,
};
pub(crate) use call::Sender;
pub use eth::{Eth, EthBuilder};
pub use rpc::{RetryConfig, RpcClient};
pub use signer::{ETH_PRIVATE_KEY_VAR, EnvSigner, LocalSigner, SignFuture, Signer};
