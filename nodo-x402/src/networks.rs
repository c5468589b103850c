//! Registry of well-known networks.
//!
//! Maps human-readable network names (e.g. `"solana"`) to CAIP-2 chain
//! identifiers and back. Challenges are allowed to name networks either
//! way; everything downstream works on [`ChainId`].
//!
//! Token deployment data (mint addresses, decimals) lives in the
//! chain-specific crates.

use crate::chain::ChainId;

/// A known network definition with its chain ID and human-readable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Human-readable network name (e.g. "solana", "solana-devnet")
    pub name: &'static str,
    /// CAIP-2 namespace (e.g. "solana")
    pub namespace: &'static str,
    /// Chain reference (for Solana, the first 32 characters of the genesis hash)
    pub reference: &'static str,
}

impl NetworkInfo {
    /// Create a [`ChainId`] from this network info.
    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.namespace, self.reference)
    }
}

/// Well-known Solana networks with their names and CAIP-2 identifiers.
pub static SOLANA_NETWORKS: &[NetworkInfo] = &[
    NetworkInfo {
        name: "solana",
        namespace: "solana",
        reference: "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
    },
    NetworkInfo {
        name: "solana-devnet",
        namespace: "solana",
        reference: "EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
    },
];

/// Looks up the chain ID for a well-known network name.
#[must_use]
pub fn chain_id_by_network_name(name: &str) -> Option<ChainId> {
    SOLANA_NETWORKS
        .iter()
        .find(|n| n.name == name)
        .map(NetworkInfo::chain_id)
}

/// Looks up the well-known network name for a chain ID.
#[must_use]
pub fn network_name_by_chain_id(chain_id: &ChainId) -> Option<&'static str> {
    SOLANA_NETWORKS
        .iter()
        .find(|n| n.namespace == chain_id.namespace() && n.reference == chain_id.reference())
        .map(|n| n.name)
}
