//! Secp256k1 keys and recoverable signatures.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::error::{ParseKeyError, SignerError};

/// A secp256k1 private key.
///
/// Parsed from 32 bytes of hex, with or without a `0x` prefix. The key
/// material is never printed; `Debug` shows only the derived address.
///
/// ```
/// use market_kit::SecretKey;
///
/// let key: SecretKey = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
///     .parse()
///     .unwrap();
/// assert_eq!(
///     key.address().to_string(),
///     "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
/// );
/// ```
#[derive(Clone)]
pub struct SecretKey {
    inner: SigningKey,
}

impl SecretKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Create from raw 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseKeyError> {
        if bytes.len() != 32 {
            return Err(ParseKeyError::InvalidLength(bytes.len()));
        }
        let inner = SigningKey::from_slice(bytes).map_err(|_| ParseKeyError::InvalidScalar)?;
        Ok(Self { inner })
    }

    /// The Ethereum address controlled by this key.
    ///
    /// This is the last 20 bytes of the Keccak-256 hash of the uncompressed
    /// public key (without the `0x04` tag).
    pub fn address(&self) -> Address {
        let point = self.inner.verifying_key().as_affine().to_encoded_point(false);
        Address::from_raw_public_key(&point.as_bytes()[1..])
    }

    /// Sign a 32-byte prehash, producing a recoverable signature.
    pub fn sign_hash(&self, hash: &B256) -> Result<Signature, SignerError> {
        let (signature, recovery_id) = self
            .inner
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;

        let bytes = signature.to_bytes();
        Ok(Signature {
            r: U256::from_be_slice(&bytes[..32]),
            s: U256::from_be_slice(&bytes[32..]),
            y_parity: recovery_id.is_y_odd(),
        })
    }

    /// Hex-encode the raw key with a `0x` prefix.
    ///
    /// Handle the result as a secret.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.inner.to_bytes()))
    }
}

impl FromStr for SecretKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| ParseKeyError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl TryFrom<&str> for SecretKey {
    type Error = ParseKeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner.to_bytes() == other.inner.to_bytes()
    }
}

impl Eq for SecretKey {}

/// A recoverable ECDSA signature over secp256k1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    /// The `r` component.
    pub r: U256,
    /// The `s` component (low-s normalized).
    pub s: U256,
    /// Parity of the `R` point's y coordinate.
    pub y_parity: bool,
}

impl Signature {
    /// The EIP-155 `v` value for the given chain.
    ///
    /// Widened to `u128` since `chain_id * 2 + 36` does not fit `u64` for
    /// the largest chain ids.
    pub fn v_eip155(&self, chain_id: u64) -> u128 {
        u128::from(self.y_parity) + 35 + u128::from(chain_id) * 2
    }

    /// The pre-EIP-155 `v` value (27 or 28).
    pub fn v_legacy(&self) -> u64 {
        u64::from(self.y_parity) + 27
    }

    /// 65-byte `r || s || v` encoding with a legacy `v`.
    pub fn as_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        out[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        out[64] = self.v_legacy() as u8;
        out
    }
}
