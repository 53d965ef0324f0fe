//! Ethereum JSON-RPC request and response types.
//!
//! Only the fields this crate reads are modelled. Quantities are hex strings
//! on the wire; `alloy-primitives` handles the encoding through serde.

use alloy_primitives::{Address, B256, BlockHash, Bytes, TxHash, U64, U256};
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Block references
// ============================================================================

/// Reference to a block for state queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockId {
    /// Most recent block.
    #[default]
    Latest,
    /// Pending state, including mempool transactions.
    Pending,
    /// Genesis block.
    Earliest,
    /// Most recent block considered safe from reorgs.
    Safe,
    /// Most recent finalized block.
    Finalized,
    /// Block at a specific height.
    Number(u64),
}

impl BlockId {
    /// Get the JSON-RPC representation.
    pub fn to_rpc_string(&self) -> String {
        match self {
            BlockId::Latest => "latest".to_string(),
            BlockId::Pending => "pending".to_string(),
            BlockId::Earliest => "earliest".to_string(),
            BlockId::Safe => "safe".to_string(),
            BlockId::Finalized => "finalized".to_string(),
            BlockId::Number(n) => format!("{:#x}", n),
        }
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_rpc_string())
    }
}

impl From<u64> for BlockId {
    fn from(height: u64) -> Self {
        Self::Number(height)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Parameters for `eth_call`, `eth_estimateGas` and `eth_sendTransaction`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// `None` deploys a contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U64>,
}

impl TransactionRequest {
    /// A call to `to` carrying `data`.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// A contract creation carrying init code.
    pub fn create(init_code: impl Into<Bytes>) -> Self {
        Self {
            data: Some(init_code.into()),
            ..Default::default()
        }
    }

    /// Set the sender.
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the attached value in wei. Zero is omitted.
    pub fn value(mut self, value: U256) -> Self {
        self.value = (!value.is_zero()).then_some(value);
        self
    }

    /// Set the gas limit.
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(U64::from(gas));
        self
    }
}

/// Filter for `eth_getLogs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockId>,
    /// Topic filters by position; `None` matches anything.
    pub topics: Vec<Option<B256>>,
}

impl LogFilter {
    /// Logs emitted by `address` whose first topic is `signature`.
    pub fn event(address: Address, signature: B256) -> Self {
        Self {
            address: Some(address),
            topics: vec![Some(signature)],
            ..Default::default()
        }
    }

    /// Restrict to an inclusive block range.
    pub fn blocks(mut self, from: BlockId, to: BlockId) -> Self {
        self.from_block = Some(from);
        self.to_block = Some(to);
        self
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A log entry emitted by a contract.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub block_hash: Option<BlockHash>,
    #[serde(default)]
    pub transaction_hash: Option<TxHash>,
    #[serde(default)]
    pub log_index: Option<U64>,
    /// True when the log was dropped by a chain reorganization.
    #[serde(default)]
    pub removed: bool,
}

impl Log {
    /// Block height as a plain integer.
    pub fn block(&self) -> Option<u64> {
        self.block_number.map(|n| n.to::<u64>())
    }
}

/// Receipt of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub block_hash: Option<BlockHash>,
    #[serde(default)]
    pub block_number: Option<U64>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    /// Set when the transaction created a contract.
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub gas_used: U256,
    /// `1` on success, `0` on revert. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Returns true unless the receipt reports a revert.
    pub fn is_success(&self) -> bool {
        self.status.is_none_or(|s| !s.is_zero())
    }

    /// Block height as a plain integer.
    pub fn block(&self) -> Option<u64> {
        self.block_number.map(|n| n.to::<u64>())
    }
}
