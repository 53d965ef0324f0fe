//! The selected account.
//!
//! Contract facades never hold an account of their own. They read the shared
//! [`AccountSelection`] when a write is issued, so switching accounts (by
//! hand, or through [`Eth::watch_accounts`](crate::Eth::watch_accounts))
//! applies to every facade created from the same client.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::Error;

use super::rpc::RpcClient;

/// Shared, observable account selection.
///
/// Cloning yields another handle to the same selection.
#[derive(Clone)]
pub struct AccountSelection {
    tx: Arc<watch::Sender<Option<Address>>>,
}

impl AccountSelection {
    /// An empty selection.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// A selection starting at `account`.
    pub fn with_account(account: Address) -> Self {
        let selection = Self::new();
        selection.select(account);
        selection
    }

    /// The currently selected account, if any.
    pub fn current(&self) -> Option<Address> {
        *self.tx.borrow()
    }

    /// The currently selected account, or [`Error::NoAccount`].
    pub fn require(&self) -> Result<Address, Error> {
        self.current().ok_or(Error::NoAccount)
    }

    /// Select `account`. Returns true if the selection changed.
    pub fn select(&self, account: Address) -> bool {
        self.set(Some(account))
    }

    /// Clear the selection. Returns true if an account was selected.
    pub fn clear(&self) -> bool {
        self.set(None)
    }

    fn set(&self, account: Option<Address>) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == account {
                return false;
            }
            *current = account;
            true
        })
    }

    /// Stream of selection changes, starting after the current value.
    ///
    /// The stream ends once every handle to the selection is dropped.
    pub fn subscribe(&self) -> impl Stream<Item = Option<Address>> + Send + 'static {
        let rx = self.tx.subscribe();
        stream::unfold(rx, |mut rx| async move {
            rx.changed().await.ok()?;
            let account = *rx.borrow_and_update();
            Some((account, rx))
        })
    }
}

impl Default for AccountSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AccountSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccountSelection")
            .field(&self.current())
            .finish()
    }
}

/// Stream returned by [`Eth::watch_accounts`](crate::Eth::watch_accounts).
pub type AccountChanges = BoxStream<'static, Result<Option<Address>, Error>>;

/// Poll `eth_accounts` and mirror its first entry into `selection`.
///
/// Yields each applied change and each failed poll. Polling only happens
/// while the stream is being driven.
///
/// A local `signer` owns the selection instead: it is selected and yielded
/// once, and the node's account list is never consulted.
pub(crate) fn watch_accounts(
    rpc: Arc<RpcClient>,
    selection: AccountSelection,
    signer: Option<Address>,
    interval: Duration,
) -> AccountChanges {
    if let Some(signer) = signer {
        if selection.select(signer) {
            info!(account = %signer, "selected signer account");
        }
        let once = stream::once(async move { Ok::<_, Error>(Some(signer)) });
        return Box::pin(once.chain(stream::pending()));
    }

    let state = (rpc, selection, false);
    Box::pin(stream::unfold(
        state,
        move |(rpc, selection, mut polled)| async move {
            loop {
                if polled {
                    tokio::time::sleep(interval).await;
                }
                polled = true;

                match rpc.accounts().await {
                    Ok(accounts) => {
                        let first = accounts.first().copied();
                        let changed = match first {
                            Some(account) => selection.select(account),
                            None => selection.clear(),
                        };
                        if changed {
                            info!(account = ?first, "selected account changed");
                            return Some((Ok(first), (rpc, selection, polled)));
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to poll eth_accounts");
                        return Some((Err(e.into()), (rpc, selection, polled)));
                    }
                }
            }
        },
    ))
}
