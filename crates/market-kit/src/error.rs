//! Error types for market-kit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error): Main error type, returned by most operations
//!   - [`RpcError`]: Transport and node errors (network, reverts, nonces, etc.)
//!   - [`ParseAmountError`]: Invalid wei/gwei/ether amount
//!   - [`ParseKeyError`]: Invalid private key
//!   - [`SignerError`]: Signing operation failures
//!   - [`ArtifactError`]: Contract artifact loading failures
//!
//! # Error Handling Examples
//!
//! ## Pattern Matching on Reverts
//!
//! ```rust,no_run
//! use market_kit::*;
//!
//! # async fn example(nft: Nft) -> Result<(), Error> {
//! match nft.burn(U256::from(7)).await {
//!     Ok(receipt) => println!("Burned in {}", receipt.transaction_hash),
//!     Err(Error::Rpc(RpcError::ExecutionReverted { reason, .. })) => {
//!         println!("Contract refused: {}", reason.unwrap_or_default());
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use alloy_primitives::{Address, Bytes, TxHash};
use thiserror::Error;

/// Error parsing an ether amount.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("Ambiguous amount '{0}'. Use explicit units like '1 ether', '20 gwei' or '1000 wei'")]
    AmbiguousAmount(String),

    #[error("Invalid amount format: '{0}'")]
    InvalidFormat(String),

    #[error("Invalid number in amount: '{0}'")]
    InvalidNumber(String),

    #[error("Amount overflow: value too large")]
    Overflow,
}

/// Error parsing a secp256k1 private key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseKeyError {
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid key length: expected 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Invalid secret scalar: key is zero or exceeds the curve order")]
    InvalidScalar,
}

/// Error during signing operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Signer {signer} cannot sign for {from}")]
    AddressMismatch { signer: Address, from: Address },
}

/// Error loading a compiled contract artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Artifact '{0}' has no deployable bytecode")]
    MissingBytecode(String),

    #[error("Artifact '{contract}' has no deployment on chain {chain_id}")]
    NotDeployed { contract: String, chain_id: u64 },
}

// ============================================================================
// RPC Errors
// ============================================================================

/// RPC-specific errors.
#[derive(Debug, Error)]
pub enum RpcError {
    // ─── Network/Transport ───
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        retryable: bool,
    },

    #[error("Timeout after {0} retries")]
    Timeout(u32),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // ─── Generic RPC Error ───
    #[error("RPC error: {message} (code: {code})")]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    // ─── Execution ───
    #[error("Execution reverted: {}", reason.as_deref().unwrap_or("no reason given"))]
    ExecutionReverted {
        reason: Option<String>,
        data: Option<Bytes>,
    },

    // ─── Transaction Pool ───
    #[error("Nonce too low: {0}")]
    NonceTooLow(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Transaction underpriced: {0}")]
    Underpriced(String),

    // ─── Node ───
    #[error("Method not supported by node: {0}")]
    MethodNotFound(String),

    #[error("Request limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl RpcError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcError::Http(e) => e.is_timeout() || e.is_connect(),
            RpcError::Timeout(_) => true,
            RpcError::Network { retryable, .. } => *retryable,
            RpcError::LimitExceeded(_) => true,
            RpcError::InternalError(_) => true,
            _ => false,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>, status_code: Option<u16>, retryable: bool) -> Self {
        RpcError::Network {
            message: message.into(),
            status_code,
            retryable,
        }
    }

    /// Returns true if the node reported a contract revert.
    pub fn is_revert(&self) -> bool {
        matches!(self, RpcError::ExecutionReverted { .. })
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// Main error type for market-kit operations.
#[derive(Debug, Error)]
pub enum Error {
    // ─── Configuration ───
    #[error(
        "No account selected. Call connect(), select an account, or pass .from() on the operation."
    )]
    NoAccount,

    #[error("Account {account} is not the contract owner {owner}")]
    NotOwner { owner: Address, account: Address },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Contract {contract} has no known deployment on {network}")]
    ContractNotAvailable { contract: String, network: String },

    // ─── Parsing ───
    #[error("Invalid address '{0}'")]
    ParseAddress(String),

    #[error(transparent)]
    ParseAmount(#[from] ParseAmountError),

    #[error(transparent)]
    ParseKey(#[from] ParseKeyError),

    // ─── RPC ───
    #[error(transparent)]
    Rpc(#[from] RpcError),

    // ─── ABI ───
    #[error("ABI decoding failed for {method}: {source}")]
    Abi {
        method: &'static str,
        #[source]
        source: alloy_sol_types::Error,
    },

    // ─── Transaction ───
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    #[error("No receipt for transaction {hash} after {waited_ms} ms")]
    ReceiptTimeout { hash: TxHash, waited_ms: u64 },

    // ─── Signing ───
    #[error("Signing error: {0}")]
    Signing(#[from] SignerError),

    // ─── Deployment ───
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Deployment of {0} produced no contract address")]
    NoContractAddress(String),
}

impl Error {
    /// Returns true if the node reported a contract revert, either while
    /// estimating/calling or in a mined receipt.
    pub fn is_revert(&self) -> bool {
        match self {
            Error::Rpc(e) => e.is_revert(),
            Error::Reverted(_) => true,
            _ => false,
        }
    }

    /// Returns the decoded revert reason, if the node supplied one.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Error::Rpc(RpcError::ExecutionReverted { reason, .. }) => reason.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Rpc(RpcError::Json(e))
    }
}
