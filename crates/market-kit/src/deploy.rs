//! Contract deployment from compiled artifacts.
//!
//! [`Artifact`] reads the JSON that Truffle and Hardhat write for each
//! contract. [`Eth::deploy`](crate::Eth::deploy) turns it into a
//! [`DeployCall`] that sends the creation transaction and waits for the
//! contract address.

use std::collections::HashMap;
use std::future::{Future, IntoFuture};
use std::path::Path;
use std::pin::Pin;

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_sol_types::abi::TokenSeq;
use alloy_sol_types::{SolType, SolValue};
use serde::Deserialize;
use tracing::info;

use crate::client::{ContractSend, Eth};
use crate::error::{ArtifactError, Error};
use crate::types::TransactionReceipt;

/// Gas limit used for deployments unless overridden.
pub const DEFAULT_DEPLOY_GAS: u64 = 1_500_000;

/// A compiled contract artifact.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Contract name as written by the compiler.
    pub contract_name: String,
    /// The contract ABI, kept as raw JSON.
    #[serde(default)]
    pub abi: serde_json::Value,
    /// Creation bytecode.
    #[serde(default)]
    bytecode: BytecodeField,
    /// Recorded deployments keyed by network id.
    #[serde(default)]
    pub networks: HashMap<String, ArtifactNetwork>,
}

/// A deployment recorded in an artifact.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactNetwork {
    /// Deployed address.
    pub address: Address,
    /// Creation transaction, when recorded.
    #[serde(default)]
    pub transaction_hash: Option<TxHash>,
}

/// Truffle and Hardhat store a hex string; Foundry nests it under `object`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(Bytes),
    Object { object: Bytes },
}

impl Default for BytecodeField {
    fn default() -> Self {
        BytecodeField::Hex(Bytes::new())
    }
}

impl Artifact {
    /// Load an artifact from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse an artifact from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Creation bytecode.
    pub fn bytecode(&self) -> &Bytes {
        match &self.bytecode {
            BytecodeField::Hex(bytes) | BytecodeField::Object { object: bytes } => bytes,
        }
    }

    /// Address recorded for `chain_id`.
    pub fn address_on(&self, chain_id: u64) -> Result<Address, ArtifactError> {
        self.networks
            .get(&chain_id.to_string())
            .map(|network| network.address)
            .ok_or_else(|| ArtifactError::NotDeployed {
                contract: self.contract_name.clone(),
                chain_id,
            })
    }
}

/// Result of a successful deployment.
#[derive(Clone, Debug)]
pub struct Deployment {
    /// Address of the new contract.
    pub address: Address,
    /// Hash of the creation transaction.
    pub transaction_hash: TxHash,
    /// Receipt of the creation transaction.
    pub receipt: TransactionReceipt,
}

/// A pending deployment.
///
/// Sent from `.from()` if given, else the selected account, else the node's
/// first account.
pub struct DeployCall {
    eth: Eth,
    name: String,
    bytecode: Bytes,
    args: Bytes,
    from: Option<Address>,
    gas: u64,
}

impl DeployCall {
    pub(crate) fn new(eth: Eth, artifact: &Artifact) -> Self {
        Self {
            eth,
            name: artifact.contract_name.clone(),
            bytecode: artifact.bytecode().clone(),
            args: Bytes::new(),
            from: None,
            gas: DEFAULT_DEPLOY_GAS,
        }
    }

    /// ABI-encode constructor arguments, given as a tuple.
    ///
    /// ```rust,no_run
    /// # use market_kit::*;
    /// # async fn example(eth: Eth, artifact: Artifact) -> Result<(), Error> {
    /// eth.deploy(&artifact)
    ///     .args(("Tomosia".to_string(), "TMS".to_string()))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn args<T>(mut self, args: T) -> Self
    where
        T: SolValue,
        for<'a> <T::SolType as SolType>::Token<'a>: TokenSeq<'a>,
    {
        self.args = args.abi_encode_params().into();
        self
    }

    /// Append already-encoded constructor arguments.
    pub fn raw_args(mut self, args: impl Into<Bytes>) -> Self {
        self.args = args.into();
        self
    }

    /// Deploy from `from`.
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the gas limit.
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Creation bytecode followed by the constructor arguments.
    pub fn init_code(&self) -> Bytes {
        let mut code = Vec::with_capacity(self.bytecode.len() + self.args.len());
        code.extend_from_slice(&self.bytecode);
        code.extend_from_slice(&self.args);
        code.into()
    }
}

impl IntoFuture for DeployCall {
    type Output = Result<Deployment, Error>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            if self.bytecode.is_empty() {
                return Err(ArtifactError::MissingBytecode(self.name).into());
            }

            let from = match self.from.or_else(|| self.eth.account()) {
                Some(from) => from,
                None => self.eth.connect().await?,
            };

            info!(contract = %self.name, %from, gas = self.gas, "Start Deploying");

            let receipt = ContractSend::create(self.eth.clone(), "constructor", self.init_code())
                .from(from)
                .gas(self.gas)
                .await?;

            let address = receipt
                .contract_address
                .ok_or_else(|| Error::NoContractAddress(self.name.clone()))?;

            info!(contract = %self.name, %address, tx = %receipt.transaction_hash, "End Deploying");

            Ok(Deployment {
                address,
                transaction_hash: receipt.transaction_hash,
                receipt,
            })
        })
    }
}
