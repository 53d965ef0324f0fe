//! Low-level JSON-RPC client for Ethereum nodes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U64, U256};
use alloy_sol_types::{Panic, Revert, SolError};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::RpcError;
use crate::types::{BlockId, Log, LogFilter, TransactionReceipt, TransactionRequest};

/// Empty positional parameter list. `()` would serialize as `null`.
const NO_PARAMS: [(); 0] = [];

/// Retry configuration for RPC calls.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Initial delay in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Backoff before retry number `attempt` (zero-based).
    fn delay(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// JSON-RPC request structure.
#[derive(Serialize)]
struct JsonRpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

/// JSON-RPC response structure.
#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
///
/// `data` is a hex string of revert data on geth/anvil, and an object
/// carrying it under `data` on ganache/hardhat.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Low-level JSON-RPC client for Ethereum.
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
    retry_config: RetryConfig,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client with the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_retry_config(url, RetryConfig::default())
    }

    /// Create a new RPC client with custom retry configuration.
    pub fn with_retry_config(url: impl Into<String>, retry_config: RetryConfig) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            retry_config,
            request_id: AtomicU64::new(0),
        }
    }

    /// Get the RPC URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make a raw RPC call with retries.
    pub async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        let total_attempts = self.retry_config.max_retries + 1;

        for attempt in 0..total_attempts {
            let request_id = self.request_id.fetch_add(1, Ordering::Relaxed);

            let request = JsonRpcRequest {
                jsonrpc: "2.0",
                id: request_id,
                method,
                params: &params,
            };

            debug!(method, id = request_id, attempt, "rpc request");

            match self.try_call::<R>(&request).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < total_attempts - 1 => {
                    let delay = self.retry_config.delay(attempt);
                    warn!(method, attempt, error = %e, ?delay, "retrying rpc request");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(RpcError::Timeout(total_attempts))
    }

    /// Single attempt to make an RPC call.
    async fn try_call<R: DeserializeOwned>(
        &self,
        request: &JsonRpcRequest<'_, impl Serialize>,
    ) -> Result<R, RpcError> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let retryable = is_retryable_status(status.as_u16());
            return Err(RpcError::network(
                format!("HTTP {}: {}", status, body),
                Some(status.as_u16()),
                retryable,
            ));
        }

        let rpc_response: JsonRpcResponse<R> =
            serde_json::from_str(&body).map_err(RpcError::Json)?;

        if let Some(error) = rpc_response.error {
            return Err(parse_rpc_error(&error));
        }

        rpc_response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("Missing result in response".to_string()))
    }

    // ========================================================================
    // High-level RPC methods
    // ========================================================================

    /// Chain id of the connected node (`eth_chainId`).
    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let id: U64 = self.call("eth_chainId", NO_PARAMS).await?;
        Ok(id.to())
    }

    /// Latest block height (`eth_blockNumber`).
    pub async fn block_number(&self) -> Result<u64, RpcError> {
        let n: U64 = self.call("eth_blockNumber", NO_PARAMS).await?;
        Ok(n.to())
    }

    /// Accounts managed by the node or wallet (`eth_accounts`).
    pub async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.call("eth_accounts", NO_PARAMS).await
    }

    /// Current gas price in wei (`eth_gasPrice`).
    pub async fn gas_price(&self) -> Result<U256, RpcError> {
        self.call("eth_gasPrice", NO_PARAMS).await
    }

    /// Account nonce (`eth_getTransactionCount`).
    pub async fn transaction_count(
        &self,
        address: Address,
        block: BlockId,
    ) -> Result<u64, RpcError> {
        let n: U64 = self
            .call("eth_getTransactionCount", (address, block))
            .await?;
        Ok(n.to())
    }

    /// Account balance in wei (`eth_getBalance`).
    pub async fn balance(&self, address: Address, block: BlockId) -> Result<U256, RpcError> {
        self.call("eth_getBalance", (address, block)).await
    }

    /// Deployed bytecode at an address (`eth_getCode`).
    pub async fn get_code(&self, address: Address, block: BlockId) -> Result<Bytes, RpcError> {
        self.call("eth_getCode", (address, block)).await
    }

    /// Gas estimate for a transaction (`eth_estimateGas`).
    pub async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, RpcError> {
        let gas: U64 = self.call("eth_estimateGas", [request]).await?;
        Ok(gas.to())
    }

    /// Execute a read-only call (`eth_call`).
    pub async fn eth_call(
        &self,
        request: &TransactionRequest,
        block: BlockId,
    ) -> Result<Bytes, RpcError> {
        self.call("eth_call", (request, block)).await
    }

    /// Submit a transaction for the node or wallet to sign (`eth_sendTransaction`).
    pub async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, RpcError> {
        self.call("eth_sendTransaction", [request]).await
    }

    /// Submit a locally signed transaction (`eth_sendRawTransaction`).
    pub async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash, RpcError> {
        self.call("eth_sendRawTransaction", [raw]).await
    }

    /// Receipt of a mined transaction, or `None` while it is pending.
    pub async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let value: serde_json::Value = self
            .call_nullable("eth_getTransactionReceipt", [hash])
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Logs matching a filter (`eth_getLogs`).
    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, RpcError> {
        self.call("eth_getLogs", [filter]).await
    }

    /// Like [`call`](Self::call), but a `null` result is a value rather
    /// than a missing one.
    async fn call_nullable<P: Serialize>(
        &self,
        method: &str,
        params: P,
    ) -> Result<serde_json::Value, RpcError> {
        match self.call::<P, serde_json::Value>(method, params).await {
            Err(RpcError::InvalidResponse(msg)) if msg == "Missing result in response" => {
                Ok(serde_json::Value::Null)
            }
            other => other,
        }
    }
}

impl Clone for RpcClient {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            client: self.client.clone(),
            retry_config: self.retry_config.clone(),
            request_id: AtomicU64::new(0),
        }
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("url", &self.url)
            .field("retry_config", &self.retry_config)
            .finish()
    }
}

/// HTTP statuses worth retrying.
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Classify a JSON-RPC error object.
fn parse_rpc_error(error: &JsonRpcError) -> RpcError {
    let message = error.message.as_str();
    let lower = message.to_ascii_lowercase();

    if error.code == 3 || lower.contains("execution reverted") || lower.contains("vm exception")
    {
        let data = error.data.as_ref().and_then(extract_revert_data);
        let reason = data
            .as_deref()
            .and_then(|data| decode_revert_reason(data))
            .or_else(|| reason_from_message(message));
        return RpcError::ExecutionReverted { reason, data };
    }

    if lower.contains("nonce too low") {
        return RpcError::NonceTooLow(error.message.clone());
    }
    if lower.contains("insufficient funds") {
        return RpcError::InsufficientFunds(error.message.clone());
    }
    if lower.contains("underpriced") {
        return RpcError::Underpriced(error.message.clone());
    }

    match error.code {
        -32601 => RpcError::MethodNotFound(error.message.clone()),
        -32005 => RpcError::LimitExceeded(error.message.clone()),
        -32603 => RpcError::InternalError(error.message.clone()),
        _ => RpcError::Rpc {
            code: error.code,
            message: error.message.clone(),
            data: error.data.clone(),
        },
    }
}

/// Pull revert bytes out of `data`, whichever shape the node used.
fn extract_revert_data(data: &serde_json::Value) -> Option<Bytes> {
    match data {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Object(map) => map.get("data").and_then(extract_revert_data),
        _ => None,
    }
}

/// Decode `Error(string)` and `Panic(uint256)` revert payloads.
fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if let Ok(revert) = Revert::abi_decode(data, true) {
        return Some(revert.reason);
    }
    if let Ok(panic) = Panic::abi_decode(data, true) {
        return Some(format!("panic code 0x{:x}", panic.code));
    }
    None
}

/// Recover a reason from the message text when no revert data came back.
fn reason_from_message(message: &str) -> Option<String> {
    let reason = if let Some((_, rest)) = message.split_once("reverted with reason string '") {
        rest.trim_end_matches('\'')
    } else if let Some((_, rest)) = message.split_once("execution reverted: ") {
        rest
    } else if let Some((_, rest)) = message.split_once("revert ") {
        rest
    } else {
        return None;
    };

    let reason = reason.trim();
    (!reason.is_empty()).then(|| reason.to_string())
}
