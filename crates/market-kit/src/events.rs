//! Contract event subscriptions.
//!
//! An [`EventSubscription`] is a [`Stream`] of decoded events built on
//! `eth_getLogs` polling, so it works against any HTTP endpoint.
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use market_kit::*;
//!
//! # async fn example(market: Marketplace) {
//! let mut sold = market.market_item_sold();
//! while let Some(event) = sold.next().await {
//!     match event {
//!         Ok(log) => println!("item {} sold for {}", log.event.itemId, log.event.price),
//!         Err(e) => eprintln!("subscription error: {}", e),
//!     }
//! }
//! # }
//! ```

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use alloy_primitives::{Address, TxHash};
use alloy_sol_types::SolEvent;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::client::RpcClient;
use crate::error::{Error, RpcError};
use crate::types::{BlockId, Log, LogFilter};

/// Default delay between `eth_getLogs` polls.
pub const DEFAULT_EVENT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default widest block range asked for in one `eth_getLogs` call.
pub const DEFAULT_MAX_BLOCK_RANGE: u64 = 2_000;

/// A decoded event together with the log it came from.
#[derive(Clone, Debug)]
pub struct DecodedLog<E> {
    /// The decoded event.
    pub event: E,
    /// The raw log.
    pub log: Log,
}

impl<E> DecodedLog<E> {
    /// Block the event was emitted in.
    pub fn block_number(&self) -> Option<u64> {
        self.log.block()
    }

    /// Transaction that emitted the event.
    pub fn transaction_hash(&self) -> Option<TxHash> {
        self.log.transaction_hash
    }
}

/// Stream of `E` events emitted by one contract.
///
/// Starts at the latest block on first poll unless
/// [`from_block`](Self::from_block) is set. Logs dropped by a reorg are
/// skipped. Failed polls are yielded as errors and the same start block is
/// retried on the next poll, so the stream never ends on its own.
///
/// Logs are fetched at most [`max_block_range`](Self::max_block_range)
/// blocks at a time. When the node rejects a range as too large the range
/// is halved for the rest of the subscription.
pub struct EventSubscription<E> {
    rpc: Arc<RpcClient>,
    address: Address,
    from_block: Option<u64>,
    poll_interval: Duration,
    max_block_range: u64,
    inner: Option<BoxStream<'static, Result<DecodedLog<E>, Error>>>,
    _event: PhantomData<fn() -> E>,
}

impl<E: SolEvent + Send + 'static> EventSubscription<E> {
    pub(crate) fn new(rpc: Arc<RpcClient>, address: Address) -> Self {
        Self {
            rpc,
            address,
            from_block: None,
            poll_interval: DEFAULT_EVENT_POLL_INTERVAL,
            max_block_range: DEFAULT_MAX_BLOCK_RANGE,
            inner: None,
            _event: PhantomData,
        }
    }

    /// Replay events from `block` onwards.
    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = Some(block);
        self
    }

    /// Delay between polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Widest block range per `eth_getLogs` call. Zero is treated as one.
    pub fn max_block_range(mut self, blocks: u64) -> Self {
        self.max_block_range = blocks.max(1);
        self
    }

    /// The contract being watched.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Log filter for this event, without a block range.
    pub fn filter(&self) -> LogFilter {
        LogFilter::event(self.address, E::SIGNATURE_HASH)
    }

    fn start(&self) -> BoxStream<'static, Result<DecodedLog<E>, Error>> {
        let state = PollState {
            rpc: self.rpc.clone(),
            filter: self.filter(),
            next_block: self.from_block,
            interval: self.poll_interval,
            chunk: self.max_block_range.max(1),
            pending: VecDeque::new(),
            idle: false,
        };

        stream::unfold(state, |mut state| async move {
            let item = state.next_event::<E>().await;
            Some((item, state))
        })
        .boxed()
    }
}

impl<E: SolEvent + Send + 'static> Stream for EventSubscription<E> {
    type Item = Result<DecodedLog<E>, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.inner.is_none() {
            this.inner = Some(this.start());
        }
        match this.inner.as_mut() {
            Some(inner) => inner.poll_next_unpin(cx),
            None => Poll::Ready(None),
        }
    }
}

impl<E> std::fmt::Debug for EventSubscription<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSubscription")
            .field("address", &self.address)
            .field("from_block", &self.from_block)
            .field("poll_interval", &self.poll_interval)
            .field("max_block_range", &self.max_block_range)
            .field("started", &self.inner.is_some())
            .finish()
    }
}

struct PollState {
    rpc: Arc<RpcClient>,
    filter: LogFilter,
    next_block: Option<u64>,
    interval: Duration,
    chunk: u64,
    pending: VecDeque<Log>,
    /// Caught up with the chain head, so wait before the next fetch.
    idle: bool,
}

impl PollState {
    async fn next_event<E: SolEvent>(&mut self) -> Result<DecodedLog<E>, Error> {
        loop {
            if let Some(log) = self.pending.pop_front() {
                if log.removed {
                    debug!(event = E::SIGNATURE, block = ?log.block(), "skipping removed log");
                    continue;
                }
                return decode_log::<E>(log);
            }

            if self.idle {
                tokio::time::sleep(self.interval).await;
            }

            match self.fetch::<E>().await {
                Ok(caught_up) => self.idle = caught_up,
                Err(e) => {
                    self.idle = true;
                    if matches!(e, Error::Rpc(RpcError::LimitExceeded(_))) && self.chunk > 1 {
                        self.chunk = (self.chunk / 2).max(1);
                        debug!(event = E::SIGNATURE, chunk = self.chunk, "narrowing log range");
                    }
                    warn!(event = E::SIGNATURE, contract = ?self.filter.address, error = %e, "event poll failed");
                    return Err(e);
                }
            }
        }
    }

    /// Fetch the next chunk of logs. Returns whether the chain head was reached.
    async fn fetch<E: SolEvent>(&mut self) -> Result<bool, Error> {
        let latest = self.rpc.block_number().await?;
        let from = match self.next_block {
            Some(block) => block,
            None => {
                info!(event = E::SIGNATURE, contract = ?self.filter.address, block = latest, "subscription connected");
                self.next_block = Some(latest);
                latest
            }
        };
        if from > latest {
            return Ok(true);
        }

        let to = from.saturating_add(self.chunk - 1).min(latest);
        let filter = self
            .filter
            .clone()
            .blocks(BlockId::Number(from), BlockId::Number(to));
        let logs = self.rpc.get_logs(&filter).await?;
        debug!(event = E::SIGNATURE, from, to, count = logs.len(), "polled logs");

        self.pending.extend(logs);
        self.next_block = Some(to + 1);
        Ok(to == latest)
    }
}

/// Decode a raw log as `E`.
pub(crate) fn decode_log<E: SolEvent>(log: Log) -> Result<DecodedLog<E>, Error> {
    let event = E::decode_raw_log(log.topics.iter().copied(), &log.data, true).map_err(
        |source| Error::Abi {
            method: E::SIGNATURE,
            source,
        },
    )?;
    info!(
        event = E::SIGNATURE,
        contract = %log.address,
        block = ?log.block(),
        tx = ?log.transaction_hash,
        "event"
    );
    Ok(DecodedLog { event, log })
}
