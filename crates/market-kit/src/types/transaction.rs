//! Legacy (EIP-155) transactions signed locally.
//!
//! Transactions submitted through `eth_sendTransaction` are signed by the
//! node or wallet and never pass through here. This module only covers the
//! local-signer path, which hands `eth_sendRawTransaction` a fully encoded
//! transaction.

use alloy_primitives::{Address, B256, Bytes, TxHash, U256};
use alloy_rlp::{Encodable, Header};
use sha3::{Digest, Keccak256};

use super::Signature;

/// An unsigned legacy transaction with EIP-155 replay protection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Sender nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient, or `None` for contract creation.
    pub to: Option<Address>,
    /// Value transferred in wei.
    pub value: U256,
    /// Calldata, or init code for contract creation.
    pub input: Bytes,
    /// Chain id folded into the signature.
    pub chain_id: u64,
}

impl Transaction {
    /// RLP payload that is hashed for signing:
    /// `[nonce, gasPrice, gas, to, value, data, chainId, 0, 0]`.
    pub fn signing_payload(&self) -> Vec<u8> {
        let to = self.to_field();
        rlp_list(&[
            &self.nonce,
            &self.gas_price,
            &self.gas_limit,
            &to,
            &self.value,
            &self.input,
            &self.chain_id,
            &0u8,
            &0u8,
        ])
    }

    /// Keccak-256 of the signing payload.
    pub fn signing_hash(&self) -> B256 {
        keccak(&self.signing_payload())
    }

    /// Attach a signature produced over [`signing_hash`](Self::signing_hash).
    pub fn into_signed(self, signature: Signature) -> SignedTransaction {
        SignedTransaction {
            transaction: self,
            signature,
        }
    }

    fn to_field(&self) -> Bytes {
        match self.to {
            Some(address) => Bytes::copy_from_slice(address.as_slice()),
            None => Bytes::new(),
        }
    }
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The unsigned transaction.
    pub transaction: Transaction,
    /// The signature.
    pub signature: Signature,
}

impl SignedTransaction {
    /// RLP encoding: `[nonce, gasPrice, gas, to, value, data, v, r, s]`.
    pub fn encoded(&self) -> Bytes {
        let tx = &self.transaction;
        let to = tx.to_field();
        let v = self.signature.v_eip155(tx.chain_id);
        rlp_list(&[
            &tx.nonce,
            &tx.gas_price,
            &tx.gas_limit,
            &to,
            &tx.value,
            &tx.input,
            &v,
            &self.signature.r,
            &self.signature.s,
        ])
        .into()
    }

    /// The transaction hash the node will report.
    pub fn hash(&self) -> TxHash {
        keccak(&self.encoded())
    }
}

fn rlp_list(fields: &[&dyn Encodable]) -> Vec<u8> {
    let payload_length: usize = fields.iter().map(|field| field.length()).sum();
    let mut out = Vec::with_capacity(payload_length + 9);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    for field in fields {
        field.encode(&mut out);
    }
    out
}

fn keccak(bytes: &[u8]) -> B256 {
    B256::from_slice(&Keccak256::digest(bytes))
}
