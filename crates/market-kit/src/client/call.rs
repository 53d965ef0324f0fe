//! Call builders for contract reads and writes.
//!
//! Reads go through [`ContractCall`], an `eth_call` of an ABI-encoded
//! [`SolCall`]. Writes go through [`ContractSend`], which resolves the sender,
//! submits the transaction and waits for its receipt. Both are futures:
//! configure them with the builder methods, then `.await`.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::SolCall;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::error::{Error, ParseAmountError, RpcError, SignerError};
use crate::types::{BlockId, IntoWei, Transaction, TransactionReceipt, TransactionRequest};

use super::eth::Eth;
use super::rpc::RpcClient;
use super::signer::Signer;

/// How long to wait for a receipt before giving up.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Delay between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Nonce conflicts are retried this many times when signing locally.
const MAX_NONCE_RETRIES: u32 = 3;

// ============================================================================
// ContractCall
// ============================================================================

/// A read-only contract call.
///
/// Awaiting executes `eth_call` and decodes the return data.
///
/// ```rust,no_run
/// # use market_kit::*;
/// # async fn example(eth: Eth, nft: Address) -> Result<(), Error> {
/// let owner = eth
///     .view(nft, abi::TomosiaNFT::ownerCall {})
///     .at_block(BlockId::Finalized)
///     .await?;
/// println!("Owner: {}", owner._0);
/// # Ok(())
/// # }
/// ```
pub struct ContractCall<C: SolCall, T> {
    rpc: Arc<RpcClient>,
    to: Address,
    call: C,
    from: Option<Address>,
    block: BlockId,
    decode: fn(C::Return) -> T,
}

impl<C: SolCall> ContractCall<C, C::Return> {
    pub(crate) fn new(rpc: Arc<RpcClient>, to: Address, call: C) -> Self {
        Self::with_decoder(rpc, to, call, std::convert::identity)
    }
}

impl<C: SolCall, T> ContractCall<C, T> {
    pub(crate) fn with_decoder(
        rpc: Arc<RpcClient>,
        to: Address,
        call: C,
        decode: fn(C::Return) -> T,
    ) -> Self {
        Self {
            rpc,
            to,
            call,
            from: None,
            block: BlockId::Latest,
            decode,
        }
    }

    /// Execute the call as `from`.
    ///
    /// Matters for views that read `msg.sender`.
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Execute against the state at `block`.
    pub fn at_block(mut self, block: impl Into<BlockId>) -> Self {
        self.block = block.into();
        self
    }

    /// The ABI-encoded calldata.
    pub fn calldata(&self) -> Bytes {
        self.call.abi_encode().into()
    }
}

impl<C, T> IntoFuture for ContractCall<C, T>
where
    C: SolCall + Send + 'static,
    T: Send + 'static,
{
    type Output = Result<T, Error>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let mut request = TransactionRequest::call(self.to, self.call.abi_encode());
            request.from = self.from;

            debug!(method = C::SIGNATURE, to = %self.to, "eth_call");
            let output = self.rpc.eth_call(&request, self.block).await?;

            let decoded = C::abi_decode_returns(&output, true).map_err(|source| Error::Abi {
                method: C::SIGNATURE,
                source,
            })?;
            Ok((self.decode)(decoded))
        })
    }
}

// ============================================================================
// ContractSend
// ============================================================================

/// Where a transaction's sender comes from.
pub(crate) enum Sender {
    /// The client's selected account at submission time.
    Selected,
    /// A fixed address.
    Account(Address),
    /// Resolved asynchronously, e.g. the contract owner.
    Resolve(BoxFuture<'static, Result<Address, Error>>),
}

/// Runs against the final sender before anything is submitted.
pub(crate) type SenderCheck =
    Box<dyn FnOnce(Address) -> BoxFuture<'static, Result<(), Error>> + Send>;

/// A state-changing contract call.
///
/// Awaiting submits the transaction and waits for a successful receipt. A
/// receipt with status `0` becomes [`Error::Reverted`].
///
/// If the client's signer (or one given with
/// [`sign_with`](Self::sign_with)) controls the sender, the transaction is
/// signed locally and sent with `eth_sendRawTransaction`. Otherwise it goes
/// through `eth_sendTransaction` and the node signs it.
pub struct ContractSend {
    eth: Eth,
    params: SendParams,
    sender: Sender,
    check: Option<SenderCheck>,
    value: Result<U256, ParseAmountError>,
    signer: Option<Arc<dyn Signer>>,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

/// Transaction fields fixed before submission.
#[derive(Clone, Debug)]
struct SendParams {
    method: &'static str,
    to: Option<Address>,
    input: Bytes,
    gas: Option<u64>,
    gas_price: Option<u128>,
}

impl ContractSend {
    /// A call of `C` on `to`.
    pub(crate) fn call<C: SolCall>(eth: Eth, to: Address, call: &C) -> Self {
        Self::new(eth, C::SIGNATURE, Some(to), call.abi_encode().into())
    }

    /// A contract creation carrying `init_code`.
    pub(crate) fn create(eth: Eth, label: &'static str, init_code: Bytes) -> Self {
        Self::new(eth, label, None, init_code)
    }

    fn new(eth: Eth, method: &'static str, to: Option<Address>, input: Bytes) -> Self {
        let receipt_timeout = eth.receipt_timeout;
        let poll_interval = eth.poll_interval;
        Self {
            eth,
            params: SendParams {
                method,
                to,
                input,
                gas: None,
                gas_price: None,
            },
            sender: Sender::Selected,
            check: None,
            value: Ok(U256::ZERO),
            signer: None,
            receipt_timeout,
            poll_interval,
        }
    }

    pub(crate) fn sender(mut self, sender: Sender) -> Self {
        self.sender = sender;
        self
    }

    /// Validate the sender once resolved, whichever way it was chosen.
    pub(crate) fn check_sender<F>(mut self, check: F) -> Self
    where
        F: FnOnce(Address) -> BoxFuture<'static, Result<(), Error>> + Send + 'static,
    {
        self.check = Some(Box::new(check));
        self
    }

    /// Send from `from` instead of the default account.
    pub fn from(mut self, from: Address) -> Self {
        self.sender = Sender::Account(from);
        self
    }

    /// Attach a value.
    ///
    /// Accepts wei as [`U256`] or integers, or strings like `"0.5 ether"`.
    pub fn value(mut self, value: impl IntoWei) -> Self {
        self.value = value.into_wei();
        self
    }

    /// Set the gas limit. Estimated by the node when unset.
    pub fn gas(mut self, gas: u64) -> Self {
        self.params.gas = Some(gas);
        self
    }

    /// Set the gas price in wei. Queried from the node when unset.
    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.params.gas_price = Some(gas_price);
        self
    }

    /// Sign locally with `signer`.
    ///
    /// Unless a sender was set explicitly, the signer's address becomes the
    /// sender. A signer that cannot sign for the resolved sender is an error.
    pub fn sign_with(mut self, signer: impl Signer + 'static) -> Self {
        if matches!(self.sender, Sender::Selected) {
            self.sender = Sender::Account(signer.address());
        }
        self.signer = Some(Arc::new(signer));
        self
    }

    /// How long awaiting waits for the receipt.
    pub fn receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Delay between receipt polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit without waiting for the receipt.
    pub async fn pending(self) -> Result<PendingTransaction, Error> {
        let ContractSend {
            eth,
            params,
            sender,
            check,
            value,
            signer,
            receipt_timeout,
            poll_interval,
        } = self;

        let value = value?;
        let from = match sender {
            Sender::Selected => eth.accounts.require()?,
            Sender::Account(address) => address,
            Sender::Resolve(resolve) => resolve.await?,
        };
        if let Some(check) = check {
            check(from).await?;
        }

        let mut request = TransactionRequest {
            from: Some(from),
            to: params.to,
            data: Some(params.input.clone()),
            ..Default::default()
        }
        .value(value);
        if let Some(gas) = params.gas {
            request = request.gas(gas);
        }
        if let Some(gas_price) = params.gas_price {
            request.gas_price = Some(U256::from(gas_price));
        }

        let signer = match signer {
            Some(signer) if signer.address() != from => {
                return Err(SignerError::AddressMismatch {
                    signer: signer.address(),
                    from,
                }
                .into());
            }
            Some(signer) => Some(signer),
            None => eth.signer.clone().filter(|signer| signer.address() == from),
        };

        let hash = match signer {
            Some(signer) => send_signed(&eth, &params, signer.as_ref(), &request, value).await?,
            None => {
                debug!(method = params.method, %from, "eth_sendTransaction");
                eth.rpc.send_transaction(&request).await?
            }
        };

        info!(method = params.method, %from, %hash, "transaction submitted");

        Ok(PendingTransaction {
            rpc: eth.rpc.clone(),
            hash,
            timeout: receipt_timeout,
            poll_interval,
        })
    }
}

/// Fill in the legacy transaction fields, sign and send raw.
async fn send_signed(
    eth: &Eth,
    params: &SendParams,
    signer: &dyn Signer,
    request: &TransactionRequest,
    value: U256,
) -> Result<TxHash, Error> {
    let from = signer.address();
    let rpc = &eth.rpc;
    let chain_id = eth.chain_id().await?;

    let gas_price = match params.gas_price {
        Some(price) => price,
        None => rpc.gas_price().await?.saturating_to::<u128>(),
    };
    let gas_limit = match params.gas {
        Some(gas) => gas,
        None => rpc.estimate_gas(request).await?,
    };

    let mut last_error = None;
    for attempt in 0..MAX_NONCE_RETRIES {
        let nonce = rpc.transaction_count(from, BlockId::Pending).await?;

        let tx = Transaction {
            nonce,
            gas_price,
            gas_limit,
            to: params.to,
            value,
            input: params.input.clone(),
            chain_id,
        };
        let signature = signer.sign_hash(tx.signing_hash()).await?;
        let raw = tx.into_signed(signature).encoded();

        debug!(method = params.method, %from, nonce, attempt, "eth_sendRawTransaction");
        match rpc.send_raw_transaction(&raw).await {
            Ok(hash) => return Ok(hash),
            Err(RpcError::NonceTooLow(message)) => {
                warn!(%from, nonce, attempt, "nonce conflict, refetching");
                last_error = Some(RpcError::NonceTooLow(message));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(last_error
        .unwrap_or_else(|| RpcError::NonceTooLow("nonce retries exhausted".to_string()))
        .into())
}

impl IntoFuture for ContractSend {
    type Output = Result<TransactionReceipt, Error>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.pending().await?.receipt().await })
    }
}

// ============================================================================
// PendingTransaction
// ============================================================================

/// A submitted transaction that may not be mined yet.
#[derive(Clone, Debug)]
pub struct PendingTransaction {
    rpc: Arc<RpcClient>,
    hash: TxHash,
    timeout: Duration,
    poll_interval: Duration,
}

impl PendingTransaction {
    /// The transaction hash.
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Poll until the transaction is mined.
    ///
    /// Fails with [`Error::Reverted`] if the receipt reports a revert and
    /// with [`Error::ReceiptTimeout`] if no receipt shows up in time.
    pub async fn receipt(self) -> Result<TransactionReceipt, Error> {
        let started = tokio::time::Instant::now();

        loop {
            if let Some(receipt) = self.rpc.transaction_receipt(self.hash).await? {
                if !receipt.is_success() {
                    warn!(hash = %self.hash, "transaction reverted");
                    return Err(Error::Reverted(self.hash));
                }
                debug!(hash = %self.hash, block = ?receipt.block(), "transaction mined");
                return Ok(receipt);
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(Error::ReceiptTimeout {
                    hash: self.hash,
                    waited_ms: waited.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
