#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Solana payment executor for the Nodo 402 pay-and-retry protocol.
//!
//! This crate implements the [`PaymentExecutor`](nodo_x402::PaymentExecutor)
//! capability for Solana: it satisfies a payment challenge with an SPL
//! token transfer whose memo instruction carries the challenge's memo,
//! binding the on-chain payment to exactly one request. The transaction
//! signature is returned as the proof.
//!
//! # Example
//!
//! ```ignore
//! use nodo_x402_svm::{Credential, SolanaExecutor};
//!
//! let credential = Credential::read_from_file("~/.config/solana/id.json")?;
//! let executor = SolanaExecutor::new(credential, "https://api.mainnet-beta.solana.com");
//! ```
//!
//! # Modules
//!
//! - [`credential`] - Keypair loading and scoped signing access
//! - [`executor`] - Transaction construction, signing, and confirmation
//! - [`networks`] - USDC deployments and default RPC endpoints
//! - [`rpc`] - RPC client abstraction (mockable in tests)

pub mod credential;
pub mod executor;
pub mod networks;
pub mod rpc;

pub use credential::{Credential, CredentialError};
pub use executor::SolanaExecutor;
pub use networks::TokenDeployment;
pub use rpc::RpcClientLike;
