//! Signer trait and implementations.
//!
//! A `Signer` knows which address it signs for and produces recoverable
//! secp256k1 signatures over 32-byte hashes. When a transaction's sender
//! matches the configured signer, the client signs it locally and submits
//! it with `eth_sendRawTransaction`. Otherwise the node (or the wallet behind
//! it) signs through `eth_sendTransaction`.
//!
//! # Implementations
//!
//! - [`LocalSigner`] - Single key stored in memory
//! - [`EnvSigner`] - Key loaded from the `ETH_PRIVATE_KEY` environment variable
//!
//! # Example
//!
//! ```rust,no_run
//! use market_kit::{Eth, LocalSigner};
//!
//! # async fn example() -> Result<(), market_kit::Error> {
//! let signer = LocalSigner::new(
//!     "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
//! )?;
//!
//! let eth = Eth::localhost().signer(signer).build();
//! let account = eth.connect().await?;
//! println!("Sending from {}", account);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use alloy_primitives::{Address, B256};

use crate::error::{Error, SignerError};
use crate::types::{SecretKey, Signature};

/// Default environment variable holding the private key.
pub const ETH_PRIVATE_KEY_VAR: &str = "ETH_PRIVATE_KEY";

/// Future returned by [`Signer::sign_hash`].
pub type SignFuture<'a> = Pin<Box<dyn Future<Output = Result<Signature, SignerError>> + Send + 'a>>;

// ============================================================================
// Signer Trait
// ============================================================================

/// Trait for signing transactions.
///
/// Signing is asynchronous so that hardware wallets or remote key services
/// can implement it; in-memory keys resolve immediately.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use market_kit::{Address, B256, SecretKey, SignFuture, Signer};
///
/// struct MyCustomSigner {
///     key: SecretKey,
/// }
///
/// impl Signer for MyCustomSigner {
///     fn address(&self) -> Address {
///         self.key.address()
///     }
///
///     fn sign_hash(&self, hash: B256) -> SignFuture<'_> {
///         Box::pin(async move { self.key.sign_hash(&hash) })
///     }
/// }
/// ```
pub trait Signer: Send + Sync {
    /// The address this signer signs for.
    fn address(&self) -> Address;

    /// Sign a 32-byte prehash.
    fn sign_hash(&self, hash: B256) -> SignFuture<'_>;
}

impl Signer for Arc<dyn Signer> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn sign_hash(&self, hash: B256) -> SignFuture<'_> {
        (**self).sign_hash(hash)
    }
}

// ============================================================================
// LocalSigner
// ============================================================================

/// A signer with a single key stored in memory.
///
/// Suitable for scripts, bots and local development chains.
///
/// ```rust
/// use market_kit::{LocalSigner, Signer};
///
/// let signer = LocalSigner::new(
///     "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
/// )
/// .unwrap();
/// assert_eq!(
///     signer.address().to_string(),
///     "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
/// );
/// ```
#[derive(Clone)]
pub struct LocalSigner {
    address: Address,
    secret_key: SecretKey,
}

impl LocalSigner {
    /// Create from a hex private key, with or without `0x`.
    pub fn new(secret_key: impl AsRef<str>) -> Result<Self, Error> {
        let secret_key: SecretKey = secret_key.as_ref().parse()?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Create from an already-parsed key.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        Self {
            address: secret_key.address(),
            secret_key,
        }
    }

    /// Create a signer with a freshly generated key.
    pub fn random() -> Self {
        Self::from_secret_key(SecretKey::generate())
    }

    /// The underlying key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish()
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_hash(&self, hash: B256) -> SignFuture<'_> {
        let signature = self.secret_key.sign_hash(&hash);
        Box::pin(async move { signature })
    }
}

// ============================================================================
// EnvSigner
// ============================================================================

/// A signer that loads its key from an environment variable.
///
/// By default, reads `ETH_PRIVATE_KEY`.
///
/// ```rust,no_run
/// use market_kit::EnvSigner;
///
/// // With ETH_PRIVATE_KEY set:
/// let signer = EnvSigner::new().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct EnvSigner {
    inner: LocalSigner,
}

impl EnvSigner {
    /// Load from the `ETH_PRIVATE_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or cannot be parsed.
    pub fn new() -> Result<Self, Error> {
        Self::from_env_var(ETH_PRIVATE_KEY_VAR)
    }

    /// Load from a custom environment variable name.
    pub fn from_env_var(key_var: &str) -> Result<Self, Error> {
        let private_key = std::env::var(key_var)
            .map_err(|_| Error::Config(format!("Environment variable {} not set", key_var)))?;

        let inner = LocalSigner::new(&private_key)?;
        Ok(Self { inner })
    }
}

impl Signer for EnvSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn sign_hash(&self, hash: B256) -> SignFuture<'_> {
        self.inner.sign_hash(hash)
    }
}
