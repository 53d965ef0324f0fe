//! Core types for the Ethereum JSON-RPC surface.
//!
//! Addresses, hashes and big integers come from `alloy-primitives`; this
//! module adds the request/response shapes, keys, local transactions and
//! amount parsing the client needs.

mod key;
mod network;
mod rpc;
mod transaction;
mod units;

pub use alloy_primitives::{Address, B256, Bytes, TxHash, U256, address};
pub use key::{SecretKey, Signature};
pub use network::Network;
pub use rpc::{BlockId, Log, LogFilter, TransactionReceipt, TransactionRequest};
pub use transaction::{SignedTransaction, Transaction};
pub use units::{IntoTokenId, IntoWei, format_ether, parse_wei};
