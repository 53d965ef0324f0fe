//! Offline tests against an in-process JSON-RPC node.
//!
//! Run with: cargo test -p market-kit --test offline

mod mock_node;

mod accounts;
mod deploy;
mod nft;
mod rpc;
