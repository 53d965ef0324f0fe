//! Known contract deployments.
//!
//! Facades accept either a raw address or a [`KnownContract`], which
//! resolves to the right address for the client's network.
//!
//! ```rust,no_run
//! use market_kit::*;
//!
//! # async fn example() -> Result<(), Error> {
//! let eth = Eth::goerli().build();
//!
//! // Resolves to the Goerli deployment
//! let market = eth.marketplace(KNOWN_MARKETPLACE_GOERLI)?;
//!
//! // Raw addresses work on any network
//! let market = eth.marketplace("0x517af5EC956b68369eeCde27eF89AE191511bEc3")?;
//! # Ok(())
//! # }
//! ```

use alloy_primitives::{Address, address};

use crate::error::Error;
use crate::types::Network;

/// A contract with verified addresses on specific networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownContract {
    /// Human-readable name for error messages.
    pub name: &'static str,
    /// Deployments by network.
    pub deployments: &'static [(Network, Address)],
}

impl KnownContract {
    /// Resolve this contract for the given network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContractNotAvailable`] if there is no deployment on
    /// `network`.
    pub fn resolve(&self, network: Network) -> Result<Address, Error> {
        self.deployments
            .iter()
            .find(|(n, _)| *n == network)
            .map(|(_, address)| *address)
            .ok_or_else(|| Error::ContractNotAvailable {
                contract: self.name.to_string(),
                network: network.to_string(),
            })
    }
}

/// Trait for types that can be resolved to a contract address.
///
/// Lets [`Eth::nft`](crate::Eth::nft) and
/// [`Eth::marketplace`](crate::Eth::marketplace) take raw addresses, strings
/// and [`KnownContract`] constants alike.
pub trait IntoContractAddress {
    /// Resolve to an address for the given network.
    fn into_contract_address(self, network: Network) -> Result<Address, Error>;
}

impl IntoContractAddress for Address {
    fn into_contract_address(self, _network: Network) -> Result<Address, Error> {
        Ok(self)
    }
}

impl IntoContractAddress for &Address {
    fn into_contract_address(self, _network: Network) -> Result<Address, Error> {
        Ok(*self)
    }
}

impl IntoContractAddress for &str {
    fn into_contract_address(self, _network: Network) -> Result<Address, Error> {
        self.trim()
            .parse()
            .map_err(|_| Error::ParseAddress(self.to_string()))
    }
}

impl IntoContractAddress for String {
    fn into_contract_address(self, network: Network) -> Result<Address, Error> {
        self.as_str().into_contract_address(network)
    }
}

impl IntoContractAddress for KnownContract {
    fn into_contract_address(self, network: Network) -> Result<Address, Error> {
        self.resolve(network)
    }
}

/// The marketplace deployed on Goerli.
///
/// - Goerli: `0x517af5EC956b68369eeCde27eF89AE191511bEc3`
pub const KNOWN_MARKETPLACE_GOERLI: KnownContract = KnownContract {
    name: "Marketplace",
    deployments: &[(
        Network::Goerli,
        address!("517af5EC956b68369eeCde27eF89AE191511bEc3"),
    )],
};
