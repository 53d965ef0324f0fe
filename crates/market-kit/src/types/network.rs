//! Network identification for Ethereum chains.

use std::fmt;

/// The Ethereum network the client is connected to.
///
/// This is used to resolve network-specific addresses for known contract
/// deployments and to pick a default RPC endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Ethereum mainnet.
    Mainnet,
    /// Goerli test network.
    Goerli,
    /// Sepolia test network.
    Sepolia,
    /// Local development node (anvil, ganache, hardhat).
    #[default]
    Localhost,
    /// Custom endpoint with unknown contract mappings.
    Custom,
}

impl Network {
    /// Returns the EIP-155 chain id, if this network has a fixed one.
    ///
    /// Local and custom nodes are asked with `eth_chainId` instead.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Network::Mainnet => Some(1),
            Network::Goerli => Some(5),
            Network::Sepolia => Some(11_155_111),
            Network::Localhost | Network::Custom => None,
        }
    }

    /// Default public RPC endpoint for this network.
    pub fn default_rpc_url(&self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some("https://ethereum-rpc.publicnode.com"),
            Network::Goerli => Some("https://ethereum-goerli-rpc.publicnode.com"),
            Network::Sepolia => Some("https://ethereum-sepolia-rpc.publicnode.com"),
            Network::Localhost => Some("http://127.0.0.1:8545"),
            Network::Custom => None,
        }
    }

    /// Returns true for public test networks.
    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Goerli | Network::Sepolia)
    }

    /// Returns the network identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Goerli => "goerli",
            Network::Sepolia => "sepolia",
            Network::Localhost => "localhost",
            Network::Custom => "custom",
        }
    }

    /// Look up a network by its identifier string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" => Some(Network::Mainnet),
            "goerli" => Some(Network::Goerli),
            "sepolia" => Some(Network::Sepolia),
            "localhost" | "local" | "development" => Some(Network::Localhost),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
