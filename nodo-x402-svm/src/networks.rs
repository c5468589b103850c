//! Well-known token deployments on Solana networks.
//!
//! Challenges usually name their asset by symbol (`"USDC"`); this module
//! maps the symbol to the mint address and decimals for each supported
//! network. Challenges may also name a mint address directly, in which
//! case the deployment table is bypassed and the decimals come from the
//! on-chain mint account.

use std::sync::LazyLock;

use nodo_x402::chain::ChainId;
use solana_pubkey::{Pubkey, pubkey};

/// A token deployment: mint address and decimals on a specific chain.
#[derive(Debug, Clone)]
pub struct TokenDeployment {
    /// CAIP-2 identifier of the chain the token is deployed on.
    pub chain_id: ChainId,
    /// Mint address of the token.
    pub mint: Pubkey,
    /// Number of decimal places.
    pub decimals: u8,
}

/// Well-known USDC deployments on Solana networks.
static USDC_DEPLOYMENTS: LazyLock<Vec<TokenDeployment>> = LazyLock::new(|| {
    vec![
        // Solana mainnet — native Circle USDC (SPL Token)
        // Verify: https://solscan.io/token/EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v
        TokenDeployment {
            chain_id: ChainId::new("solana", "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp"),
            mint: pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
            decimals: 6,
        },
        // Solana devnet — native Circle USDC testnet (SPL Token)
        // Verify: https://explorer.solana.com/address/4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU?cluster=devnet
        TokenDeployment {
            chain_id: ChainId::new("solana", "EtWTRABZaYq6iMfeYKouRu166VU2xqa1"),
            mint: pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU"),
            decimals: 6,
        },
    ]
});

/// Returns all known USDC deployments on Solana chains.
#[must_use]
pub fn usdc_deployments() -> &'static [TokenDeployment] {
    &USDC_DEPLOYMENTS
}

/// Returns the USDC deployment for a specific chain, if known.
#[must_use]
pub fn usdc_deployment(chain_id: &ChainId) -> Option<&'static TokenDeployment> {
    USDC_DEPLOYMENTS.iter().find(|d| d.chain_id == *chain_id)
}

/// Returns the default public RPC endpoint for a well-known chain.
#[must_use]
pub fn default_rpc_url(chain_id: &ChainId) -> Option<&'static str> {
    match chain_id.reference() {
        "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp" => Some("https://api.mainnet-beta.solana.com"),
        "EtWTRABZaYq6iMfeYKouRu166VU2xqa1" => Some("https://api.devnet.solana.com"),
        _ => None,
    }
}
