#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the Nodo 402 pay-and-retry protocol.
//!
//! This crate provides the foundational types for automating the HTTP
//! `402 Payment Required` flow over a blockchain micropayment rail. When a
//! server demands payment for a resource, it issues a *challenge* naming an
//! amount, an asset, a recipient, and a memo that binds the payment to the
//! request. A client satisfies the challenge through a [`PaymentExecutor`]
//! and retries the request with the resulting [`PaymentProof`] attached.
//!
//! The crate is transport- and chain-agnostic: the HTTP retry loop lives in
//! `nodo-x402-http`, and the Solana executor lives in `nodo-x402-svm`.
//!
//! # Modules
//!
//! - [`amount`] - Human-readable currency amount parsing
//! - [`chain`] - CAIP-2 blockchain identifiers
//! - [`error`] - Challenge and executor error taxonomy
//! - [`executor`] - The payment-executor capability trait
//! - [`networks`] - Registry of well-known networks
//! - [`proto`] - Wire format types for challenges and proofs
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod amount;
pub mod chain;
pub mod error;
pub mod executor;
pub mod networks;
pub mod proto;

pub use amount::MoneyAmount;
pub use chain::ChainId;
pub use error::{ChallengeError, ExecutorError};
pub use executor::PaymentExecutor;
pub use proto::{PaymentChallenge, PaymentProof};
